//! Equitable coal retirement and renewable replacement
//!
//! This module implements a multi-year Mixed-Integer Linear Programming
//! (MILP) formulation that decides which coal plants retire, when, and which
//! renewable-energy (RE) sites are built to replace their generation.
//!
//! ## Problem Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EQUITABLE COAL RETIREMENT                                              │
//! │  ─────────────────────────                                              │
//! │                                                                         │
//! │  Given:                                                                 │
//! │    • Coal plants with capacity, historical generation, costs,           │
//! │      health damages and employment factors                              │
//! │    • Candidate RE sites with capacity factors, costs and limits         │
//! │    • An ordered set of planning years                                   │
//! │                                                                         │
//! │  Decide, per year:                                                      │
//! │    • Which coal plants stay online (binary)                             │
//! │    • Which RE site/plant pairs are online, and their capacity           │
//! │                                                                         │
//! │  Minimize:                                                              │
//! │    alpha·System cost + beta·Health cost − gamma·Jobs                    │
//! │                                                                         │
//! │  Subject to:                                                            │
//! │    • Each plant's historical generation is met by coal or its RE        │
//! │    • Site and pair capacity limits                                      │
//! │    • Investment and retirement event bookkeeping                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## MILP Formulation
//!
//! Indices: r (RE site), c (coal plant), y (year position, 0 = first year).
//!
//! ```text
//! minimize  Σ_y (1+d)^-y · [ alpha·S_y + beta·H_y − gamma·J_y ]
//!
//!   S_y = Σ_c COALFOPEX·COALCAP·coalOnline + COALVOPEX·coalGen
//!       + Σ_rc REFOPEX·reCap + RECAPEX·capInvest + REVOPEX·reGen
//!   H_y = Σ_c HD·coalGen
//!   J_y = Σ_c RETEF·capRetire + COALOMEF·coalGen
//!       + Σ_rc CONEF·capInvest + REOMEF·reCap
//!
//! subject to:
//!   (1)  coalGen[c,y] = HISTGEN[c]·coalOnline[c,y]
//!   (2)  Σ_r reGen[r,c,y] = HISTGEN[c] − coalGen[c,y]
//!   (3)  reGen[r,c,y] = CF[r]·reCap[r,c,y]·8760
//!   (4)  reCap[r,c,y] ≤ MAXCAP[r,c]·reOnline[r,c,y]
//!   (5)  Σ_c reCap[r,c,y] ≤ SITEMAXCAP[r]
//!   (6)  capInvest[r,c,y] = reCap[r,c,y] − reCap[r,c,y−1]
//!   (7)  capInvest[r,c,y] ≤ MAXCAP[r,c]·reInvest[r,c,y]
//!   (8)  capRetire[c,y] = COALCAP[c]·coalRetire[c,y]
//!   (9)  reInvest[r,c,y] = reOnline[r,c,y] − reOnline[r,c,y−1]
//!   (10) Σ_r reInvest[r,c,y] ≤ MAXSITES[c]·coalRetire[c,y]
//!   (11) coalRetire[c,y] = coalOnline[c,y−1] − coalOnline[c,y]
//!
//!   In the first year the y−1 terms of (6) and (9) are zero and
//!   coalOnline[c,y−1] in (11) is 1.
//!
//!   reInvest, coalRetire, reOnline, coalOnline ∈ {0,1}; all others ≥ 0
//! ```
//!
//! Because coalRetire is binary, (11) gives coalOnline[c,y] ≤
//! coalOnline[c,y−1]: a retired plant never comes back online.

mod export;
mod model;
mod problem;
mod solution;
mod solver;

#[cfg(test)]
mod test_fixtures;

pub use export::{COAL_RESULTS_FILE, RE_RESULTS_FILE};
pub use model::{
    build_model, ConstraintFamily, LinearConstraint, LinearExpr, ModelOptions,
    ObjectiveComponents, ObjectiveWeights, RetirementModel, Sense, VarId, VariableFamily,
    VariableKind, VariableLayout,
};
pub use problem::{EquitableRetirement, ScenarioResult};
pub use solution::{extract, round_objective, ObjectiveBreakdown, RetirementOutput};
pub use solver::{
    solve_model, LpSolverKind, SolveReport, SolverConfig, SolverStatus, TerminationCondition,
};
