// pt-BR number handling shared by the engine and any presentation layer.

pub mod brazilian_format {
    use anyhow::{anyhow, Result};
    use std::str::FromStr;

    /// Parses a pt-BR decimal. When a comma is present it is the decimal
    /// separator and dots are thousand separators ("1.234,56"); otherwise the
    /// text is read as a plain decimal ("1234.56"). Non-finite results fail.
    pub fn parse_decimal(s: &str) -> Result<f64> {
        let trimmed = s.trim();
        let normalized = if trimmed.contains(',') {
            trimmed.replace('.', "").replace(',', ".")
        } else {
            trimmed.to_string()
        };

        let value = f64::from_str(&normalized)
            .map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))?;
        if !value.is_finite() {
            return Err(anyhow!("Failed to parse decimal '{}': not a finite number", s));
        }
        Ok(value)
    }

    /// Formats with a comma decimal separator and dot thousand separators.
    pub fn format_decimal(value: f64, decimals: usize) -> String {
        let formatted = format!("{:.decimals$}", value.abs(), decimals = decimals);
        let (int_part, frac_part) = match formatted.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (formatted.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        let sign = if value < 0.0 && value.abs() >= 0.5 * 10f64.powi(-(decimals as i32)) {
            "-"
        } else {
            ""
        };
        match frac_part {
            Some(frac) => format!("{}{},{}", sign, grouped, frac),
            None => format!("{}{}", sign, grouped),
        }
    }

    /// Brazilian real, e.g. `R$ 1.234,56`.
    pub fn format_currency(value: f64) -> String {
        let body = format_decimal(value, 2);
        match body.strip_prefix('-') {
            Some(abs) => format!("-R$ {}", abs),
            None => format!("R$ {}", body),
        }
    }

}
