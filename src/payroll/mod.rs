//! Salary slip field projection.
//!
//! Totals are computed over the fixed component enumeration below, always
//! on decrypted numeric strings. A decryption failure upstream must surface
//! as an error; it is never coerced to zero here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Allowance component fields of a salary slip.
pub const ALLOWANCE_FIELDS: &[&str] = &[
    "basic",
    "dearness_allowance",
    "house_rent_allowance",
    "conveyance_allowance",
    "medical_allowance",
    "utility_allowance",
    "overtime_compensation",
    "dislocation_allowance",
    "leave_encashment",
    "bonus",
    "arrears",
    "auto_allowance",
    "incentive",
    "fuel_allowance",
    "others_allowances",
];

/// Deduction component fields of a salary slip.
pub const DEDUCTION_FIELDS: &[&str] = &[
    "leave_deductions",
    "late_deductions",
    "eobi_deduction",
    "sessi_deduction",
    "provident_fund_deduction",
    "gratuity_fund_deduction",
    "vehicle_loan_deduction",
    "other_loans_deduction",
    "advance_salary_deductions",
    "medical_insurance",
    "life_insurance",
    "penalties",
    "others_deductions",
    "tax_deduction",
];

pub fn is_component_field(name: &str) -> bool {
    ALLOWANCE_FIELDS.contains(&name) || DEDUCTION_FIELDS.contains(&name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipTotals {
    pub total_allowances: Decimal,
    pub total_deductions: Decimal,
    pub net_payable: Decimal,
}

/// Sum the allowance and deduction components of a decrypted slip.
/// Missing or non-numeric values count as zero.
pub fn compute_totals(fields: &BTreeMap<String, String>) -> SlipTotals {
    let total_allowances = sum_fields(fields, ALLOWANCE_FIELDS);
    let total_deductions = sum_fields(fields, DEDUCTION_FIELDS);
    SlipTotals {
        total_allowances,
        total_deductions,
        net_payable: total_allowances - total_deductions,
    }
}

fn sum_fields(fields: &BTreeMap<String, String>, names: &[&str]) -> Decimal {
    names
        .iter()
        .filter_map(|name| fields.get(*name))
        .map(|v| v.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO))
        .sum()
}
