/// Display helpers for energy and power figures.

/// Format an energy value with an appropriate unit prefix.
pub fn format_joules(joules: f64, precision: usize) -> String {
    if joules < 1.0 {
        format!("{:.*}mJ", precision, joules * 1000.0)
    } else if joules < 1000.0 {
        format!("{:.*}J", precision, joules)
    } else {
        format!("{:.*}kJ", precision, joules / 1000.0)
    }
}

/// Format a power value with an appropriate unit prefix.
pub fn format_watts(watts: f64, precision: usize) -> String {
    if watts < 1.0 {
        format!("{:.*}mW", precision, watts * 1000.0)
    } else if watts < 1000.0 {
        format!("{:.*}W", precision, watts)
    } else {
        format!("{:.*}kW", precision, watts / 1000.0)
    }
}

/// Running average over a trailing window.
pub fn running_average(values: &[f64], window: usize) -> Vec<f64> {
    if values.is_empty() || window == 0 {
        return Vec::new();
    }
    let mut result = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = i.saturating_sub(window - 1);
        let slice = &values[start..=i];
        result.push(slice.iter().sum::<f64>() / slice.len() as f64);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_joules_prefixes() {
        assert_eq!(format_joules(0.5, 1), "500.0mJ");
        assert_eq!(format_joules(90.0, 1), "90.0J");
        assert_eq!(format_joules(1500.0, 1), "1.5kJ");
    }

    #[test]
    fn test_format_watts_prefixes() {
        assert_eq!(format_watts(0.25, 0), "250mW");
        assert_eq!(format_watts(100.0, 1), "100.0W");
        assert_eq!(format_watts(1200.0, 1), "1.2kW");
    }

    #[test]
    fn test_running_average_window() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        let avg = running_average(&values, 2);
        assert_eq!(avg, vec![1.0, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_running_average_empty() {
        assert!(running_average(&[], 5).is_empty());
    }
}
