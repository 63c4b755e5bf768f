//! Unit tests for quote arithmetic and rule validation.

use crate::pricing::domain::{
    NewPricingRule, PriceBreakdown, PricingDomainError, PricingRule, ServiceRate, extra_units,
    round_currency,
};
use crate::request::domain::{ServiceDetails, ServiceType, TowType};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;

fn dec(value: &str) -> Decimal {
    value.parse().unwrap_or_else(|_| panic!("invalid decimal literal {value}"))
}

#[fixture]
fn standard_rule() -> PricingRule {
    PricingRule::new(
        NewPricingRule {
            name: "Tarifa estándar".to_owned(),
            base_exit_fee: dec("60"),
            included_km: dec("25"),
            price_per_km_light: dec("2.5"),
            price_per_km_heavy: dec("4"),
        },
        &DefaultClock,
    )
    .expect("rule values are valid")
}

#[rstest]
fn tow_beyond_included_distance_charges_per_km(standard_rule: PricingRule) {
    let quote = standard_rule.quote_tow(dec("40"), TowType::Light, false);

    assert_eq!(quote.total, dec("97.50"));
    match quote.breakdown {
        PriceBreakdown::Tow { billable_km, .. } => assert_eq!(billable_km, dec("15")),
        PriceBreakdown::Flat { .. } => panic!("expected tow breakdown"),
    }
}

#[rstest]
#[case("10", "60")]
#[case("25", "60")]
#[case("25.004", "60")]
#[case("30", "80")]
fn heavy_tow_uses_heavy_rate(
    standard_rule: PricingRule,
    #[case] distance: &str,
    #[case] expected: &str,
) {
    let quote = standard_rule.quote_tow(dec(distance), TowType::Heavy, false);
    assert_eq!(quote.total, dec(expected));
}

#[rstest]
fn approximate_distance_is_flagged(standard_rule: PricingRule) {
    let quote = standard_rule.quote_tow(dec("12.345"), TowType::Light, true);

    match quote.breakdown {
        PriceBreakdown::Tow {
            distance_km,
            distance_is_approximate,
            ..
        } => {
            assert_eq!(distance_km, dec("12.35"));
            assert!(distance_is_approximate);
        }
        PriceBreakdown::Flat { .. } => panic!("expected tow breakdown"),
    }
}

#[rstest]
fn new_rules_start_inactive(standard_rule: PricingRule) {
    assert!(!standard_rule.is_active());
}

#[rstest]
fn blank_rule_name_is_rejected() {
    let result = PricingRule::new(
        NewPricingRule {
            name: "   ".to_owned(),
            base_exit_fee: dec("60"),
            included_km: dec("25"),
            price_per_km_light: dec("2.5"),
            price_per_km_heavy: dec("4"),
        },
        &DefaultClock,
    );
    assert_eq!(result, Err(PricingDomainError::EmptyRuleName));
}

#[rstest]
fn negative_rate_names_the_field() {
    let result = PricingRule::new(
        NewPricingRule {
            name: "Rota".to_owned(),
            base_exit_fee: dec("60"),
            included_km: dec("25"),
            price_per_km_light: dec("-1"),
            price_per_km_heavy: dec("4"),
        },
        &DefaultClock,
    );
    assert_eq!(
        result,
        Err(PricingDomainError::NegativeAmount {
            field: "price_per_km_light"
        })
    );
}

#[rstest]
fn fuel_charges_each_gallon_after_the_first() {
    let rate = ServiceRate::new(ServiceType::Fuel, dec("20"), dec("5"), chrono::Utc::now())
        .expect("rate values are valid");

    let quote = rate.quote(&ServiceDetails::Fuel { gallons: 3 });

    assert_eq!(quote.total, dec("30.00"));
}

#[rstest]
#[case(ServiceType::Tire, ServiceDetails::Tire { has_spare: false }, 1)]
#[case(ServiceType::Tire, ServiceDetails::Tire { has_spare: true }, 0)]
#[case(ServiceType::Fuel, ServiceDetails::Fuel { gallons: 1 }, 0)]
#[case(ServiceType::Fuel, ServiceDetails::Fuel { gallons: 4 }, 3)]
#[case(ServiceType::Battery, ServiceDetails::None, 0)]
#[case(ServiceType::Locksmith, ServiceDetails::None, 0)]
fn surcharge_units_follow_service_details(
    #[case] service_type: ServiceType,
    #[case] details: ServiceDetails,
    #[case] expected: u32,
) {
    assert_eq!(extra_units(service_type, &details), expected);
}

#[rstest]
fn tows_have_no_flat_rate() {
    let result = ServiceRate::new(ServiceType::Tow, dec("20"), dec("5"), chrono::Utc::now());
    assert_eq!(
        result,
        Err(PricingDomainError::FlatRateNotApplicable(ServiceType::Tow))
    );
}

#[rstest]
#[case("10.005", "10.01")]
#[case("-10.005", "-10.01")]
#[case("10.004", "10.00")]
fn currency_rounds_half_away_from_zero(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(round_currency(dec(input)), dec(expected));
}
