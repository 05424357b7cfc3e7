use super::rates::RateSchedule;
use super::tax::{
    class2_ni, class4_ni, corporation_tax, dividend_tax, employee_ni, income_tax,
    personal_allowance,
};
use super::types::{BreakdownLineItem, ScenarioConfig, ScenarioId, ScenarioResult};

/// Flat expense allowance deducted before deemed-employment taxation.
const INSIDE_RULE_EXPENSE_ALLOWANCE: f64 = 0.05;

#[derive(Debug, Clone, Copy)]
struct EmploymentOutcome {
    earnings: f64,
    income_tax: f64,
    ni: f64,
}

impl EmploymentOutcome {
    fn new(earnings: f64, rates: &RateSchedule) -> Self {
        let earnings = earnings.max(0.0);
        Self {
            earnings,
            income_tax: income_tax(earnings, rates),
            ni: employee_ni(earnings, rates),
        }
    }

    fn net(self) -> f64 {
        self.earnings - self.income_tax - self.ni
    }
}

#[derive(Debug, Clone, Copy)]
struct SoleTraderOutcome {
    profit: f64,
    income_tax: f64,
    class4: f64,
    class2: f64,
}

impl SoleTraderOutcome {
    fn new(profit: f64, rates: &RateSchedule) -> Self {
        Self {
            profit,
            income_tax: income_tax(profit, rates),
            class4: class4_ni(profit, rates),
            class2: class2_ni(profit, rates),
        }
    }

    fn net(self) -> f64 {
        self.profit - self.income_tax - self.class4 - self.class2
    }
}

#[derive(Debug, Clone, Copy)]
struct DirectorOutcome {
    salary: f64,
    profit: f64,
    corporation_tax: f64,
    dividends: f64,
    salary_tax: f64,
    salary_ni: f64,
    dividend_tax: f64,
}

impl DirectorOutcome {
    fn new(gross: f64, salary: f64, deductions: f64, rates: &RateSchedule) -> Self {
        let salary = salary.max(0.0).min(gross);
        let profit = (gross - salary - deductions).max(0.0);
        let corporation_tax = corporation_tax(profit, rates);
        let dividends = profit - corporation_tax;
        Self {
            salary,
            profit,
            corporation_tax,
            dividends,
            salary_tax: income_tax(salary, rates),
            salary_ni: employee_ni(salary, rates),
            dividend_tax: dividend_tax(dividends, salary, rates),
        }
    }

    fn net(self) -> f64 {
        self.salary - self.salary_tax - self.salary_ni + self.dividends - self.dividend_tax
    }
}

#[derive(Debug, Clone, Copy)]
struct CompanyCosts {
    expenses: f64,
    insurance: f64,
}

impl CompanyCosts {
    fn total(self) -> f64 {
        self.expenses + self.insurance
    }
}

/// Deductions taken before deemed-employment taxation.
#[derive(Debug, Clone, Copy)]
enum InsideDeductions {
    FlatAllowance(f64),
    Itemised(CompanyCosts),
}

/// Every scenario's figures, computed once. Breakdown lines and the net
/// income are both read from here.
#[derive(Debug, Clone, Copy)]
enum ScenarioOutcome {
    Paye(EmploymentOutcome),
    SoleTrader(SoleTraderOutcome),
    Inside {
        gross: f64,
        deductions: InsideDeductions,
        employment: EmploymentOutcome,
    },
    Director {
        gross: f64,
        costs: Option<CompanyCosts>,
        director: DirectorOutcome,
    },
}

impl ScenarioOutcome {
    fn new(
        rates: &RateSchedule,
        scenario: ScenarioId,
        gross: f64,
        config: &ScenarioConfig,
    ) -> Self {
        let gross = gross.max(0.0);
        match scenario {
            ScenarioId::Paye => ScenarioOutcome::Paye(EmploymentOutcome::new(gross, rates)),
            ScenarioId::SoleTrader => {
                ScenarioOutcome::SoleTrader(SoleTraderOutcome::new(gross, rates))
            }
            ScenarioId::LtdOutside => ScenarioOutcome::Director {
                gross,
                costs: None,
                director: DirectorOutcome::new(gross, rates.personal_allowance, 0.0, rates),
            },
            ScenarioId::LtdInside => {
                let allowance = gross * INSIDE_RULE_EXPENSE_ALLOWANCE;
                ScenarioOutcome::Inside {
                    gross,
                    deductions: InsideDeductions::FlatAllowance(allowance),
                    employment: EmploymentOutcome::new(gross - allowance, rates),
                }
            }
            ScenarioId::Custom => {
                let costs = CompanyCosts {
                    expenses: config.expenses,
                    insurance: config.insurance,
                };
                if config.inside_rule_applies {
                    ScenarioOutcome::Inside {
                        gross,
                        deductions: InsideDeductions::Itemised(costs),
                        employment: EmploymentOutcome::new(gross - costs.total(), rates),
                    }
                } else {
                    ScenarioOutcome::Director {
                        gross,
                        costs: Some(costs),
                        director: DirectorOutcome::new(gross, config.salary, costs.total(), rates),
                    }
                }
            }
        }
    }

    fn net(self) -> f64 {
        match self {
            ScenarioOutcome::Paye(employment) => employment.net(),
            ScenarioOutcome::SoleTrader(trader) => trader.net(),
            ScenarioOutcome::Inside { employment, .. } => employment.net(),
            ScenarioOutcome::Director { director, .. } => director.net(),
        }
    }

    fn items(self, rates: &RateSchedule) -> Vec<BreakdownLineItem> {
        match self {
            ScenarioOutcome::Paye(employment) => paye_items(employment, rates),
            ScenarioOutcome::SoleTrader(trader) => sole_trader_items(trader, rates),
            ScenarioOutcome::Inside {
                gross,
                deductions,
                employment,
            } => inside_items(gross, deductions, employment),
            ScenarioOutcome::Director {
                gross,
                costs,
                director,
            } => director_items(gross, costs, director),
        }
    }
}

pub fn evaluate_scenario(
    rates: &RateSchedule,
    scenario: ScenarioId,
    gross: f64,
    config: &ScenarioConfig,
) -> ScenarioResult {
    let outcome = ScenarioOutcome::new(rates, scenario, gross, config);
    ScenarioResult {
        scenario,
        name: scenario.display_name(),
        items: outcome.items(rates),
        net: outcome.net(),
    }
}

/// Net income only, without building the breakdown.
pub fn scenario_net(
    rates: &RateSchedule,
    scenario: ScenarioId,
    gross: f64,
    config: &ScenarioConfig,
) -> f64 {
    ScenarioOutcome::new(rates, scenario, gross, config).net()
}

fn allowance_line(gross: f64, rates: &RateSchedule) -> BreakdownLineItem {
    let allowance = personal_allowance(gross, rates);
    let note = (allowance < rates.personal_allowance).then_some("reduced");
    BreakdownLineItem::deduction("Personal Allowance", allowance).with_note(note)
}

fn paye_items(employment: EmploymentOutcome, rates: &RateSchedule) -> Vec<BreakdownLineItem> {
    let gross = employment.earnings;
    vec![
        BreakdownLineItem::line("Gross Salary", gross),
        allowance_line(gross, rates),
        BreakdownLineItem::subtotal(
            "Taxable Income",
            (gross - personal_allowance(gross, rates)).max(0.0),
        ),
        BreakdownLineItem::deduction("Income Tax", employment.income_tax),
        BreakdownLineItem::deduction("Employee NI", employment.ni),
    ]
}

fn sole_trader_items(trader: SoleTraderOutcome, rates: &RateSchedule) -> Vec<BreakdownLineItem> {
    vec![
        BreakdownLineItem::line("Gross Profit", trader.profit),
        allowance_line(trader.profit, rates),
        BreakdownLineItem::deduction("Income Tax", trader.income_tax),
        BreakdownLineItem::deduction("Class 4 NI", trader.class4),
        BreakdownLineItem::deduction("Class 2 NI", trader.class2),
    ]
}

fn inside_items(
    gross: f64,
    deductions: InsideDeductions,
    employment: EmploymentOutcome,
) -> Vec<BreakdownLineItem> {
    let mut items = vec![BreakdownLineItem::line("Gross Revenue", gross)];
    match deductions {
        InsideDeductions::FlatAllowance(allowance) => {
            items.push(BreakdownLineItem::deduction(
                "5% Expenses Allowance",
                allowance,
            ));
        }
        InsideDeductions::Itemised(costs) => {
            items.push(BreakdownLineItem::deduction("Business Expenses", costs.expenses));
            items.push(BreakdownLineItem::deduction(
                "Professional Insurance",
                costs.insurance,
            ));
        }
    }
    items.extend([
        BreakdownLineItem::subtotal("Taxable Income", employment.earnings),
        BreakdownLineItem::deduction("Income Tax", employment.income_tax),
        BreakdownLineItem::deduction("Employee NI", employment.ni),
    ]);
    items
}

/// Salary plus dividends. Company costs, when given, come out of profit
/// before corporation tax and get their own lines.
fn director_items(
    gross: f64,
    costs: Option<CompanyCosts>,
    director: DirectorOutcome,
) -> Vec<BreakdownLineItem> {
    let mut items = vec![
        BreakdownLineItem::line("Gross Revenue", gross),
        BreakdownLineItem::deduction("Director Salary", director.salary),
    ];
    let corporation_tax_label = match costs {
        Some(costs) => {
            items.push(BreakdownLineItem::deduction("Business Expenses", costs.expenses));
            items.push(BreakdownLineItem::deduction(
                "Professional Insurance",
                costs.insurance,
            ));
            "Corporation Tax"
        }
        None => "Corporation Tax (19-25%)",
    };
    items.extend([
        BreakdownLineItem::subtotal("Company Profit", director.profit),
        BreakdownLineItem::deduction(corporation_tax_label, director.corporation_tax),
        BreakdownLineItem::subtotal("Dividends Available", director.dividends),
        BreakdownLineItem::divider(),
        BreakdownLineItem::line("Salary (in hand)", director.salary),
        BreakdownLineItem::deduction("Income Tax on Salary", director.salary_tax),
        BreakdownLineItem::deduction("Employee NI on Salary", director.salary_ni),
        BreakdownLineItem::line("Dividends Received", director.dividends),
        BreakdownLineItem::deduction("Dividend Tax", director.dividend_tax),
    ]);
    items
}
