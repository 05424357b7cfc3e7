use super::rates::RateSchedule;

/// Allowance after the taper: the base amount shrinks by `taper_rate` per
/// pound above `taper_start` and is gone from [`RateSchedule::allowance_taper_end`].
pub fn personal_allowance(income: f64, rates: &RateSchedule) -> f64 {
    let income = income.max(0.0);
    if income >= rates.allowance_taper_end() {
        return 0.0;
    }
    let reduction = (income - rates.allowance_taper_start).max(0.0) * rates.allowance_taper_rate;
    (rates.personal_allowance - reduction).max(0.0)
}

/// Income tax on total income. Bands are consumed from the top down against
/// the taxable figure (income less the tapered allowance).
pub fn income_tax(income: f64, rates: &RateSchedule) -> f64 {
    let income = income.max(0.0);
    let allowance = personal_allowance(income, rates);
    let mut remaining = (income - allowance).max(0.0);

    let mut tax = 0.0;
    if remaining > rates.additional_rate_threshold {
        tax += (remaining - rates.additional_rate_threshold) * rates.additional_rate;
        remaining = rates.additional_rate_threshold;
    }
    if remaining > rates.higher_rate_threshold {
        tax += (remaining - rates.higher_rate_threshold) * rates.higher_rate;
        remaining = rates.higher_rate_threshold;
    }
    tax + remaining * rates.basic_rate
}

fn two_band_ni(amount: f64, rates: &RateSchedule, main_rate: f64, upper_rate: f64) -> f64 {
    let mut remaining = amount.max(0.0);
    let mut ni = 0.0;
    if remaining > rates.ni_upper_threshold {
        ni += (remaining - rates.ni_upper_threshold) * upper_rate;
        remaining = rates.ni_upper_threshold;
    }
    if remaining > rates.ni_primary_threshold {
        ni += (remaining - rates.ni_primary_threshold) * main_rate;
    }
    ni
}

pub fn employee_ni(income: f64, rates: &RateSchedule) -> f64 {
    two_band_ni(
        income,
        rates,
        rates.employee_ni_main_rate,
        rates.employee_ni_upper_rate,
    )
}

pub fn class4_ni(profit: f64, rates: &RateSchedule) -> f64 {
    two_band_ni(profit, rates, rates.class4_main_rate, rates.class4_upper_rate)
}

/// Weekly flat charge collapsed to an annual figure; not prorated.
pub fn class2_ni(profit: f64, rates: &RateSchedule) -> f64 {
    if profit > rates.class2_threshold {
        rates.class2_annual
    } else {
        0.0
    }
}

/// Corporation tax with marginal relief applied as a blended rate on the
/// profit above the lower limit.
pub fn corporation_tax(profit: f64, rates: &RateSchedule) -> f64 {
    let profit = profit.max(0.0);
    let lower = rates.corporation_lower_limit;
    if profit <= lower {
        return profit * rates.corporation_small_rate;
    }
    if profit >= rates.corporation_upper_limit {
        return profit * rates.corporation_main_rate;
    }
    lower * rates.corporation_small_rate + (profit - lower) * rates.corporation_marginal_rate()
}

/// Dividends sit on top of `other_income` when working out which bands they
/// fall into.
pub fn dividend_tax(dividends: f64, other_income: f64, rates: &RateSchedule) -> f64 {
    let mut remaining = (dividends - rates.dividend_allowance).max(0.0);
    let other = other_income.max(0.0);

    let basic_room = (rates.higher_rate_threshold - other).max(0.0);
    let higher_room = (rates.additional_rate_threshold - other - basic_room).max(0.0);

    let mut tax = 0.0;
    let at_basic = remaining.min(basic_room);
    tax += at_basic * rates.dividend_basic_rate;
    remaining -= at_basic;

    let at_higher = remaining.min(higher_room);
    tax += at_higher * rates.dividend_higher_rate;
    remaining -= at_higher;

    tax + remaining * rates.dividend_additional_rate
}
