use crate::model::{DiscountKind, DiscountPolicy, LineItem};
use serde::{Deserialize, Serialize};

/// Default tax rate, 14% in basis points.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1400;

/// How tax and discount are applied on top of the line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPolicy {
    pub rate_bps: u32,
    /// Limit the discount to `[0, subtotal]`. Off by default, so an oversized
    /// fixed discount produces a negative taxable amount and total.
    pub clamp_discount: bool,
}

impl TaxPolicy {
    pub fn rate_percent(&self) -> f64 {
        f64::from(self.rate_bps) / 100.0
    }
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            rate_bps: DEFAULT_TAX_RATE_BPS,
            clamp_discount: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub discount_value: f64,
    pub taxable: f64,
    pub tax: f64,
    pub total: f64,
}

/// Pure totals computation. Invalid item amounts count as zero.
pub fn compute_totals(
    items: &[LineItem],
    discount: &DiscountPolicy,
    tax_enabled: bool,
    policy: &TaxPolicy,
) -> Totals {
    let subtotal: f64 = items.iter().map(LineItem::line_total).sum();
    let value = if discount.value.is_finite() {
        discount.value
    } else {
        0.0
    };
    let mut discount_value = match discount.kind {
        DiscountKind::Percent => subtotal * value / 100.0,
        DiscountKind::Fixed => value,
    };
    if policy.clamp_discount {
        discount_value = discount_value.clamp(0.0, subtotal.max(0.0));
    }
    let taxable = subtotal - discount_value;
    let tax = if tax_enabled {
        taxable * f64::from(policy.rate_bps) / 10_000.0
    } else {
        0.0
    };
    Totals {
        subtotal,
        discount_value,
        taxable,
        tax,
        total: taxable + tax,
    }
}

/// Number formatting for amounts shown in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyFormat {
    pub currency: String,
    pub currency_after: bool,
    pub decimals: usize,
    pub thousands_separator: Option<char>,
    pub decimal_separator: char,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            currency: "EGP".to_string(),
            currency_after: true,
            decimals: 2,
            thousands_separator: Some(','),
            decimal_separator: '.',
        }
    }
}

impl MoneyFormat {
    pub fn format(&self, amount: f64) -> String {
        let number = self.format_number(amount);
        if self.currency.is_empty() {
            number
        } else if self.currency_after {
            format!("{number} {}", self.currency)
        } else {
            format!("{}{number}", self.currency)
        }
    }

    pub fn format_number(&self, amount: f64) -> String {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        let fixed = format!("{:.*}", self.decimals, amount.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (fixed.as_str(), None),
        };
        let mut out = String::with_capacity(fixed.len() + 8);
        // "-0.00" reads as a sign error on a quotation.
        if amount < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
            out.push('-');
        }
        let digits = int_part.len();
        for (idx, ch) in int_part.chars().enumerate() {
            if idx > 0 && (digits - idx) % 3 == 0 {
                if let Some(sep) = self.thousands_separator {
                    out.push(sep);
                }
            }
            out.push(ch);
        }
        if let Some(frac_part) = frac_part {
            out.push(self.decimal_separator);
            out.push_str(frac_part);
        }
        out
    }
}

/// Quantity as shown in the table: whole numbers without decimals.
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        let text = format!("{quantity:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Percentage label such as `10%` or `12.5%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_quantity(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<LineItem> {
        vec![LineItem::new("A", 100.0, 2.0), LineItem::new("B", 50.0, 1.0)]
    }

    #[test]
    fn percent_discount_with_tax() {
        let totals = compute_totals(
            &items(),
            &DiscountPolicy::percent(10.0),
            true,
            &TaxPolicy::default(),
        );
        assert_eq!(totals.subtotal, 250.0);
        assert_eq!(totals.discount_value, 25.0);
        assert_eq!(totals.taxable, 225.0);
        assert_eq!(totals.tax, 31.5);
        assert_eq!(totals.total, 256.5);
    }

    #[test]
    fn fixed_discount_without_tax() {
        let totals = compute_totals(
            &items(),
            &DiscountPolicy::fixed(40.0),
            false,
            &TaxPolicy::default(),
        );
        assert_eq!(totals.discount_value, 40.0);
        assert_eq!(totals.tax, 0.0);
        assert_eq!(totals.total, 210.0);
    }

    #[test]
    fn no_items_means_all_zero() {
        let totals = compute_totals(&[], &DiscountPolicy::percent(10.0), true, &TaxPolicy::default());
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.discount_value, 0.0);
        assert_eq!(totals.tax, 0.0);
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn oversized_discount_goes_negative_unless_clamped() {
        let discount = DiscountPolicy::fixed(400.0);
        let open = compute_totals(&items(), &discount, false, &TaxPolicy::default());
        assert_eq!(open.taxable, -150.0);
        assert_eq!(open.total, -150.0);

        let clamped_policy = TaxPolicy {
            clamp_discount: true,
            ..TaxPolicy::default()
        };
        let clamped = compute_totals(&items(), &discount, true, &clamped_policy);
        assert_eq!(clamped.discount_value, 250.0);
        assert_eq!(clamped.taxable, 0.0);
        assert_eq!(clamped.total, 0.0);
    }

    #[test]
    fn custom_rate_is_applied() {
        let policy = TaxPolicy {
            rate_bps: 500,
            clamp_discount: false,
        };
        let totals = compute_totals(&items(), &DiscountPolicy::none(), true, &policy);
        assert_eq!(totals.tax, 12.5);
        assert_eq!(policy.rate_percent(), 5.0);
    }

    #[test]
    fn money_format_groups_thousands() {
        let money = MoneyFormat::default();
        assert_eq!(money.format(1_234_567.891), "1,234,567.89 EGP");
        assert_eq!(money.format(0.0), "0.00 EGP");
        assert_eq!(money.format(-25.0), "-25.00 EGP");
        assert_eq!(money.format(-0.001), "0.00 EGP");

        let dollars = MoneyFormat {
            currency: "$".to_string(),
            currency_after: false,
            ..MoneyFormat::default()
        };
        assert_eq!(dollars.format(999.5), "$999.50");
    }

    #[test]
    fn quantities_drop_trailing_zeros() {
        assert_eq!(format_quantity(3.0), "3");
        assert_eq!(format_quantity(2.5), "2.5");
        assert_eq!(format_quantity(1.333), "1.33");
        assert_eq!(format_percent(12.5), "12.5%");
    }
}
