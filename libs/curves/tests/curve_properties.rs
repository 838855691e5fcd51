//! Curve Property Tests
//!
//! These tests validate properties that must hold for every valid pool state,
//! regardless of the specific reserves, weights or trade sizes.

mod common;

use bonding_curves::fixed_point::{self, rpow};
use bonding_curves::power;
use bonding_curves::{
    BancorFormula, ConstantProductMath, ExponentialCurve, WeightedMath, U256, WAD,
};
use common::*;
use ethers_core::types::U512;
use proptest::prelude::*;

prop_compose! {
    /// Balances between 1 and 1e9 whole tokens
    fn valid_balance()(
        units in 1u64..1_000_000_000,
        frac in 0u64..1_000_000_000_000_000_000,
    ) -> U256 {
        U256::from(units) * WAD + U256::from(frac)
    }
}

prop_compose! {
    /// Balances between 1e6 and 1e12 whole tokens
    fn deep_balance()(units in 1_000_000u64..1_000_000_000_000, frac in any::<u64>()) -> U256 {
        U256::from(units) * WAD + U256::from(frac)
    }
}

prop_compose! {
    /// Weights between 0.1 and 1.0
    fn valid_weight()(raw in 100_000_000_000_000_000u64..=1_000_000_000_000_000_000) -> U256 {
        U256::from(raw)
    }
}

prop_compose! {
    /// Trade size between one millionth and all of the balance, in parts per million
    fn trade_fraction()(ppm in 1u64..=1_000_000) -> U256 {
        U256::from(ppm)
    }
}

prop_compose! {
    /// Trade size between 1e-12 and 1e-6 of the balance, in parts per trillion
    fn dust_fraction()(ppt in 1u64..=1_000_000) -> U256 {
        U256::from(ppt)
    }
}

fn fraction_of(balance: U256, ppm: U256) -> U256 {
    balance * ppm / U256::from(1_000_000u64)
}

fn trillionth_of(balance: U256, ppt: U256) -> U256 {
    balance * ppt / U256::exp10(12)
}

fn wide(value: U256) -> U512 {
    U512::from(value)
}

proptest! {
    #[test]
    fn weighted_output_positive_and_below_balance(
        balance_in in valid_balance(),
        balance_out in valid_balance(),
        weight_in in valid_weight(),
        weight_out in valid_weight(),
        ppm in trade_fraction(),
    ) {
        let amount_in = fraction_of(balance_in, ppm);
        let out = WeightedMath::compute_out_given_exact_in(
            balance_in, weight_in, balance_out, weight_out, amount_in,
        ).unwrap();

        prop_assert!(out > U256::zero());
        prop_assert!(out < balance_out);
    }

    #[test]
    fn weighted_round_trip_recovers_input(
        balance_in in valid_balance(),
        balance_out in valid_balance(),
        weight_in in valid_weight(),
        weight_out in valid_weight(),
        ppm in trade_fraction(),
    ) {
        let amount_in = fraction_of(balance_in, ppm);
        let out = WeightedMath::compute_out_given_exact_in(
            balance_in, weight_in, balance_out, weight_out, amount_in,
        ).unwrap();
        let back = WeightedMath::compute_in_given_exact_out(
            balance_in, weight_in, balance_out, weight_out, out,
        ).unwrap();

        let error = relative_error(back, to_f64(amount_in));
        prop_assert!(error < TOLERANCE, "in {} back {} error {}", amount_in, back, error);
    }

    #[test]
    fn weighted_output_monotone_in_amount(
        balance_in in valid_balance(),
        balance_out in valid_balance(),
        weight_in in valid_weight(),
        weight_out in valid_weight(),
        ppm in 1u64..500_000,
        step in 1u64..500_000,
    ) {
        let smaller = fraction_of(balance_in, U256::from(ppm));
        let larger = fraction_of(balance_in, U256::from(ppm + step));

        let out_small = WeightedMath::compute_out_given_exact_in(
            balance_in, weight_in, balance_out, weight_out, smaller,
        ).unwrap();
        let out_large = WeightedMath::compute_out_given_exact_in(
            balance_in, weight_in, balance_out, weight_out, larger,
        ).unwrap();

        prop_assert!(out_small <= out_large);
    }

    #[test]
    fn equal_weights_match_constant_product(
        balance_in in valid_balance(),
        balance_out in valid_balance(),
        ppm in trade_fraction(),
    ) {
        let half = WAD / U256::from(2);
        let amount_in = fraction_of(balance_in, ppm);

        let weighted = WeightedMath::compute_out_given_exact_in(
            balance_in, half, balance_out, half, amount_in,
        ).unwrap();
        let constant_product = ConstantProductMath::calculate_tokens_for_eth(
            balance_in, balance_out, amount_in,
        ).unwrap();

        prop_assert!(weighted <= constant_product, "{} > {}", weighted, constant_product);
        prop_assert!(relative_error(weighted, to_f64(constant_product)) < TOLERANCE);
    }

    #[test]
    fn weighted_out_never_exceeds_exact_curve(
        balance_in in valid_balance(),
        balance_out in valid_balance(),
        weight_out in 100_000_000_000_000_000u64..=500_000_000_000_000_000,
        ppm in trade_fraction(),
    ) {
        // weight_in = 2 * weight_out, so the exact output is rational:
        // balance_out * amount_in * (2 * balance_in + amount_in) / (balance_in + amount_in)^2
        let weight_out = U256::from(weight_out);
        let amount_in = fraction_of(balance_in, ppm);
        let out = WeightedMath::compute_out_given_exact_in(
            balance_in, weight_out * U256::from(2), balance_out, weight_out, amount_in,
        ).unwrap();

        let grown = balance_in + amount_in;
        let paid = wide(out) * wide(grown) * wide(grown);
        let spread = balance_in * U256::from(2) + amount_in;
        let owed = wide(balance_out) * wide(amount_in) * wide(spread);
        prop_assert!(paid <= owed, "out {} for {} in", out, amount_in);
    }

    #[test]
    fn weighted_in_always_covers_exact_curve(
        balance_in in valid_balance(),
        balance_out in valid_balance(),
        weight_in in 100_000_000_000_000_000u64..=500_000_000_000_000_000,
        ppm in 1u64..1_000_000,
    ) {
        // weight_out = 2 * weight_in, so the exact input is rational:
        // balance_in * (balance_out^2 - left^2) / left^2
        let weight_in = U256::from(weight_in);
        let amount_out = fraction_of(balance_out, U256::from(ppm));
        prop_assume!(!amount_out.is_zero());
        let cost = WeightedMath::compute_in_given_exact_out(
            balance_in, weight_in, balance_out, weight_in * U256::from(2), amount_out,
        ).unwrap();

        let left = balance_out - amount_out;
        let charged = wide(cost) * wide(left) * wide(left);
        let shrink = wide(balance_out) * wide(balance_out) - wide(left) * wide(left);
        let owed = wide(balance_in) * shrink;
        prop_assert!(charged >= owed, "cost {} for {} out", cost, amount_out);
    }

    #[test]
    fn weighted_dust_trades_stay_accurate(
        balance_in in deep_balance(),
        balance_out in deep_balance(),
        weight_in in valid_weight(),
        weight_out in valid_weight(),
        ppt in dust_fraction(),
    ) {
        let amount_in = trillionth_of(balance_in, ppt);
        let out = WeightedMath::compute_out_given_exact_in(
            balance_in, weight_in, balance_out, weight_out, amount_in,
        ).unwrap();
        let expected = weighted_out(
            to_f64(balance_in),
            as_fraction(weight_in, WAD),
            to_f64(balance_out),
            as_fraction(weight_out, WAD),
            to_f64(amount_in),
        );
        let error = relative_error(out, expected);
        prop_assert!(error < TOLERANCE, "out {} expected {:e}", out, expected);

        let half = WAD / U256::from(2);
        let even = WeightedMath::compute_out_given_exact_in(
            balance_in, half, balance_out, half, amount_in,
        ).unwrap();
        let constant_product = ConstantProductMath::calculate_tokens_for_eth(
            balance_in, balance_out, amount_in,
        ).unwrap();
        prop_assert!(even <= constant_product);
    }

    #[test]
    fn bancor_dust_deposits_stay_accurate(
        supply in deep_balance(),
        reserve in deep_balance(),
        ratio in 100_000u32..=1_000_000,
        ppt in dust_fraction(),
    ) {
        let deposit = trillionth_of(reserve, ppt);
        let minted =
            BancorFormula::calculate_purchase_return(supply, reserve, ratio, deposit).unwrap();
        let expected = bancor_purchase(to_f64(supply), to_f64(reserve), ratio, to_f64(deposit));
        prop_assert!(
            relative_error(minted, expected) < TOLERANCE,
            "minted {} expected {:e}",
            minted,
            expected
        );
    }

    #[test]
    fn bancor_purchase_non_decreasing(
        supply in valid_balance(),
        reserve in valid_balance(),
        ratio in 1u32..=1_000_000,
        deposit in 0u64..u64::MAX,
        step in 1u64..1_000_000_000_000_000,
    ) {
        let first = BancorFormula::calculate_purchase_return(
            supply, reserve, ratio, U256::from(deposit),
        ).unwrap();
        let second = BancorFormula::calculate_purchase_return(
            supply, reserve, ratio, U256::from(deposit) + U256::from(step),
        ).unwrap();

        prop_assert!(first <= second);
    }

    #[test]
    fn bancor_fund_cost_matches_deposit(
        supply in valid_balance(),
        reserve in valid_balance(),
        ratio in 10_000u32..=1_000_000,
        ppm in trade_fraction(),
    ) {
        let deposit = fraction_of(reserve, ppm);
        let minted =
            BancorFormula::calculate_purchase_return(supply, reserve, ratio, deposit).unwrap();
        prop_assume!(minted >= U256::from(1_000_000_000u64));

        let cost = BancorFormula::calculate_fund_cost(supply, reserve, ratio, minted).unwrap();
        let error = relative_error(cost, to_f64(deposit));
        prop_assert!(error < TOLERANCE, "minted {} for {} but costs {}", minted, deposit, cost);
    }

    #[test]
    fn exponential_flat_delta_is_linear(
        spot in 1u64..u64::MAX,
        num_items in 0u64..1_000_000,
    ) {
        let spot = U256::from(spot);
        let info = ExponentialCurve::get_buy_info(spot, WAD, num_items, U256::zero(), U256::zero());

        prop_assert!(info.error.is_ok());
        prop_assert_eq!(info.input_value, spot * U256::from(num_items));
    }

    #[test]
    fn exponential_round_trip_with_fees_favors_pool(
        spot in 1_000_000_000_000u64..10_000_000_000_000_000_000,
        growth in 0u64..500_000_000_000_000_000,
        num_items in 1u64..50,
    ) {
        let delta = WAD + U256::from(growth);
        let fee = U256::from(1_000_000_000_000_000u64);

        let spot = U256::from(spot);
        let bought = ExponentialCurve::get_buy_info(spot, delta, num_items, fee, U256::zero());
        prop_assert!(bought.error.is_ok());

        let sold = ExponentialCurve::get_sell_info(
            bought.new_spot_price, delta, num_items, fee, U256::zero(),
        );
        prop_assert!(sold.error.is_ok());
        prop_assert!(sold.output_value < bought.input_value);
    }

    #[test]
    fn rpow_identities(x in 0u64..u64::MAX) {
        let x = U256::from(x);
        prop_assert_eq!(rpow(x, 0, WAD).unwrap(), WAD);
        prop_assert_eq!(rpow(x, 1, WAD).unwrap(), x);
        prop_assert_eq!(rpow(U256::zero(), 1 + x.low_u64() % 64, WAD).unwrap(), U256::zero());
    }

    #[test]
    fn power_directed_variants_bracket(
        base in 1_000_000_000u64..u64::MAX,
        exp_n in 1u64..1_000_000,
    ) {
        let base = U256::from(base);
        let exp_n = U256::from(exp_n);
        let exp_d = U256::from(1_000_000u64);

        let value = power::pow_wad(base, exp_n, exp_d).unwrap();
        let up = power::pow_up(base, WAD, exp_n, exp_d).unwrap();
        let down = power::pow_down(base, WAD, exp_n, exp_d).unwrap();

        prop_assert!(down <= value);
        prop_assert!(value <= up);
    }

    #[test]
    fn mul_div_rounding_brackets(x in any::<u128>(), y in any::<u128>(), d in 1u128..u128::MAX) {
        let (x, y, d) = (U256::from(x), U256::from(y), U256::from(d));
        let down = fixed_point::mul_div_down(x, y, d).unwrap();
        let up = fixed_point::mul_div_up(x, y, d).unwrap();

        prop_assert!(up == down || up == down + U256::one());
    }
}
