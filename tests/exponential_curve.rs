// tests/exponential_curve.rs
use bonding_curve::{curve::*, error::CurveError};

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    const UNIT: u64 = 1_000_000;

    // base price 1000, each whole token multiplies the price by 3/2
    fn setup() -> ExponentialCurve {
        ExponentialCurve::new(1_000, 3, 2, 50 * UNIT, 6).unwrap()
    }

    #[test]
    fn test_price() {
        let curve = setup();
        assert_eq!(curve.unit().unwrap(), UNIT);
        assert_eq!(curve.price_at_supply(0).unwrap(), 1_000);
        assert_eq!(curve.price_at_supply(UNIT).unwrap(), 1_500);
        assert_eq!(curve.price_at_supply(2 * UNIT).unwrap(), 2_250);
        assert_eq!(curve.price_at_supply(40 * UNIT).unwrap(), 11_057_332_321);
    }

    #[test]
    fn test_whole_unit_costs() {
        let curve = setup();
        assert_eq!(curve.cost(0, UNIT).unwrap(), 1_000);
        assert_eq!(curve.cost(UNIT, 2 * UNIT).unwrap(), 1_500);
        assert_eq!(curve.cost(0, 2 * UNIT).unwrap(), 2_500);
        assert_eq!(curve.reserve_at_supply(0).unwrap(), 2_000);
    }

    #[test]
    fn test_quotes() {
        let curve = setup();
        let buy = curve.quote_buy(0, 2 * UNIT).unwrap();
        assert_eq!(
            buy,
            BuyQuote {
                total_cost: 2_500,
                new_supply: 2 * UNIT,
                new_price: 2_250,
            }
        );
        let sell = curve.quote_sell(2 * UNIT, UNIT).unwrap();
        assert_eq!(
            sell,
            SellQuote {
                proceeds: 1_500,
                new_supply: UNIT,
                new_price: 1_500,
            }
        );
        assert_eq!(
            curve.quote_buy(49 * UNIT, 2 * UNIT),
            Err(CurveError::SupplyCapExceeded)
        );
        assert_eq!(curve.quote_sell(0, 1), Err(CurveError::InsufficientSupply));
    }

    #[test]
    fn test_random_walk_keeps_reserve() {
        let curve = setup();
        let mut rng = rand::thread_rng();
        let mut supply = 0u64;
        let mut reserve = 0u64;
        let round = 200;

        for _ in 0..round {
            if supply > 0 && rng.gen_bool(0.4) {
                let amount = rng.gen_range(1, supply + 1);
                let quote = curve.quote_sell(supply, amount).unwrap();
                assert!(quote.proceeds <= reserve);
                reserve -= quote.proceeds;
                supply = quote.new_supply;
            } else if supply < curve.max_supply {
                let amount = rng.gen_range(1, (curve.max_supply - supply).min(5 * UNIT) + 1);
                let quote = curve.quote_buy(supply, amount).unwrap();
                reserve += quote.total_cost;
                supply = quote.new_supply;
            }
            let backing =
                curve.reserve_at_supply(supply).unwrap() - curve.reserve_at_supply(0).unwrap();
            assert_eq!(u128::from(reserve), backing);
        }
    }
}
