//! Strategy configuration
//!
//! Pools pick their pricing strategy from a TOML document. Fractional
//! parameters are written as human decimals (`delta = "1.0001"`) and converted
//! exactly to WAD, so no float ever touches a curve parameter.
//!
//! ```toml
//! kind = "exponential"
//! delta = "1.0001"
//! fee_multiplier = "0.005"
//! protocol_fee_multiplier = "0.001"
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use ethers_core::types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::pool_traits::PricingStrategy;

/// WAD carries 18 decimal places
const WAD_DECIMALS: u32 = 18;

/// Strategy parameters as written in configuration files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    Weighted {
        weight_in: Decimal,
        weight_out: Decimal,
    },
    Exponential {
        delta: Decimal,
        #[serde(default)]
        fee_multiplier: Decimal,
        #[serde(default)]
        protocol_fee_multiplier: Decimal,
    },
    Bancor {
        /// Parts per million
        reserve_ratio: u32,
    },
    ConstantProduct,
}

impl StrategyConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse strategy configuration")
    }

    /// Load a strategy configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read strategy config {}", path.display()))?;
        let config = Self::from_toml_str(&source)
            .with_context(|| format!("Invalid strategy config {}", path.display()))?;

        info!(path = %path.display(), kind = config.kind_name(), "Loaded strategy configuration");
        Ok(config)
    }

    /// Convert to WAD parameters and validate the resulting strategy
    pub fn into_strategy(self) -> Result<PricingStrategy> {
        let strategy = match self {
            StrategyConfig::Weighted {
                weight_in,
                weight_out,
            } => PricingStrategy::Weighted {
                weight_in: decimal_to_wad(weight_in).context("weight_in")?,
                weight_out: decimal_to_wad(weight_out).context("weight_out")?,
            },
            StrategyConfig::Exponential {
                delta,
                fee_multiplier,
                protocol_fee_multiplier,
            } => PricingStrategy::Exponential {
                delta: decimal_to_wad(delta).context("delta")?,
                fee_multiplier: decimal_to_wad(fee_multiplier).context("fee_multiplier")?,
                protocol_fee_multiplier: decimal_to_wad(protocol_fee_multiplier)
                    .context("protocol_fee_multiplier")?,
            },
            StrategyConfig::Bancor { reserve_ratio } => PricingStrategy::Bancor { reserve_ratio },
            StrategyConfig::ConstantProduct => PricingStrategy::ConstantProduct,
        };

        strategy
            .validate()
            .context("Strategy parameters rejected")?;
        Ok(strategy)
    }

    fn kind_name(&self) -> &'static str {
        match self {
            StrategyConfig::Weighted { .. } => "weighted",
            StrategyConfig::Exponential { .. } => "exponential",
            StrategyConfig::Bancor { .. } => "bancor",
            StrategyConfig::ConstantProduct => "constant_product",
        }
    }
}

/// Exact decimal to WAD conversion
///
/// Fails on negative values and on more than 18 fractional digits rather
/// than rounding silently.
pub fn decimal_to_wad(value: Decimal) -> Result<U256> {
    if value.is_sign_negative() && !value.is_zero() {
        bail!("Value {} must not be negative", value);
    }

    let normalized = value.normalize();
    let scale = normalized.scale();
    if scale > WAD_DECIMALS {
        bail!("Value {} has more than {} decimal places", value, WAD_DECIMALS);
    }

    let mantissa = normalized.mantissa().unsigned_abs();
    Ok(U256::from(mantissa) * U256::exp10((WAD_DECIMALS - scale) as usize))
}
