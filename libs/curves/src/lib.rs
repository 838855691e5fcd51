//! # Bonding Curves - Fixed-Point Pricing Engine
//!
//! ## Purpose
//!
//! Deterministic pricing core for token launch pools. Given a pool's current
//! state and a trade size, each curve returns exact integer amounts under an
//! explicit rounding policy: whatever the trader receives rounds down,
//! whatever the trader pays rounds up. No floating point is used anywhere in
//! the pricing path.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pool snapshots (reserves, supply, spot price) owned by the caller
//! - **Output Destinations**: Pool contracts or simulators committing the returned snapshot
//! - **Curve Families**: Weighted (Balancer), exponential items (sudoswap), Bancor,
//!   constant product
//! - **Precision**: `U256` values scaled by `WAD = 10^18`, 512-bit intermediates, powers
//!   carried at `RAY = 10^36` where a curve subtracts one from them
//! - **Configuration**: TOML strategy files with exact decimal parameters
//!
//! ## Architecture Role
//!
//! Two primitive layers ([`fixed_point`] and [`power`]) carry every curve. The
//! [`PricingStrategy`] enum picks one curve at pool creation and prices trades
//! through the [`BondingCurve`] trait, returning a [`Quote`] with the proposed
//! new [`PoolSnapshot`]. Nothing here mutates pool state.
//!
//! See [`architecture_diagram()`] for visual representation of the data flow.
//!
//! ## Performance Profile
//!
//! - **Integer power**: at most 64 multiply steps per `rpow`
//! - **Fractional power**: exactly 96 squarings plus 96 table steps, independent of input size
//! - **Memory**: no allocation in any pricing path
//! - **Accuracy**: power relative error well under 0.01% across the supported envelope

pub mod bancor_formula;
pub mod config;
pub mod constant_product;
pub mod error;
pub mod exponential_curve;
pub mod fixed_point;
pub mod pool_traits;
pub mod power;
pub mod weighted_math;

pub use bancor_formula::{BancorFormula, MAX_RATIO};
pub use config::StrategyConfig;
pub use constant_product::ConstantProductMath;
pub use error::{CurveError, CurveErrorCode, MathError};
pub use exponential_curve::{BuyInfo, ExponentialCurve, SellInfo};
pub use fixed_point::{RAY, WAD};
pub use pool_traits::{BondingCurve, CurveKind, PoolSnapshot, PricingStrategy, Quote};
pub use weighted_math::WeightedMath;

/// Common types for curve calculations
pub use ethers_core::types::U256;

/// Architecture diagram showing curve library data flow and component relationships
#[cfg_attr(doc, aquamarine::aquamarine)]
/// ```mermaid
/// graph LR
///     subgraph Input["📊 Input Layer"]
///         TC[TOML Strategy Config]
///         PS[Pool Snapshot]
///         TA[Trade Amount]
///     end
///
///     subgraph Strategy["🧭 Strategy Dispatch"]
///         ST[PricingStrategy]
///         BC[BondingCurve trait]
///     end
///
///     subgraph Curves["📐 Curves"]
///         WM[Weighted Math]
///         EC[Exponential Curve]
///         BF[Bancor Formula]
///         CP[Constant Product]
///     end
///
///     subgraph Math["🧮 Fixed-Point Primitives"]
///         FP[WAD mul/div + rpow]
///         PW[log2/exp2 Power]
///     end
///
///     subgraph Output["🎯 Results"]
///         QT[Quote]
///         NS[New Snapshot]
///     end
///
///     TC --> ST
///     PS --> BC
///     TA --> BC
///     ST --> BC
///
///     BC --> WM
///     BC --> EC
///     BC --> BF
///     BC --> CP
///
///     WM --> PW
///     BF --> PW
///     EC --> FP
///     CP --> FP
///     PW --> FP
///
///     BC --> QT
///     QT --> NS
///
///     style Input fill:#e1f5fe
///     style Strategy fill:#fff3e0
///     style Curves fill:#f3e5f5
///     style Math fill:#fffde7
///     style Output fill:#e8f5e9
/// ```
pub fn architecture_diagram() {
    // This function exists solely for documentation purposes
    // The diagram is rendered by aquamarine in rustdoc
}
