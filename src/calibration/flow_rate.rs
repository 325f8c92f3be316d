// Flow-rate correction transform
//
// Linear inverse scaling: when less liquid came out than intended the flow
// rate is scaled up proportionally, when more came out it is scaled down.

/// Compute the corrected flow rate from a target/actual volume pair.
///
/// # Arguments
/// * `current_flow_rate` - Flow rate in effect before calibration (ml/s)
/// * `target_volume` - Volume the user asked to dispense (ml)
/// * `actual_volume` - Volume the user measured afterwards (ml)
///
/// # Returns
/// `current_flow_rate * (target_volume / actual_volume)`, or
/// `current_flow_rate` unchanged when `actual_volume == 0`.
///
/// No input is range-checked. Negative volumes produce a negative result,
/// which classification then reports as out of bounds.
pub fn compute_corrected_flow_rate(
    current_flow_rate: f64,
    target_volume: f64,
    actual_volume: f64,
) -> f64 {
    if actual_volume == 0.0 {
        return current_flow_rate;
    }
    current_flow_rate * (target_volume / actual_volume)
}

/// Round a flow rate to 2 decimal places for reporting and persistence.
pub fn round_flow_rate(flow_rate: f64) -> f64 {
    (flow_rate * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_keeps_flow_rate() {
        assert_eq!(compute_corrected_flow_rate(30.0, 100.0, 100.0), 30.0);
    }

    #[test]
    fn test_half_actual_doubles_flow_rate() {
        assert_eq!(compute_corrected_flow_rate(30.0, 100.0, 50.0), 60.0);
    }

    #[test]
    fn test_double_actual_halves_flow_rate() {
        assert_eq!(compute_corrected_flow_rate(30.0, 100.0, 200.0), 15.0);
    }

    #[test]
    fn test_zero_actual_returns_current() {
        assert_eq!(compute_corrected_flow_rate(30.0, 100.0, 0.0), 30.0);
        assert_eq!(compute_corrected_flow_rate(12.5, -3.0, 0.0), 12.5);
        assert_eq!(compute_corrected_flow_rate(0.0, 100.0, 0.0), 0.0);
    }

    #[test]
    fn test_matches_inverse_scaling_formula() {
        let cases = [
            (30.0, 100.0, 95.0),
            (5.0, 10.0, 9.8),
            (500.0, 200.0, 180.0),
            (999.0, 10000.0, 9999.0),
            (0.37, 40.0, 12.5),
        ];
        for (current, target, actual) in cases {
            let expected = current * (target / actual);
            let result = compute_corrected_flow_rate(current, target, actual);
            assert!(
                (result - expected).abs() < 1e-12,
                "({}, {}, {}) -> {} expected {}",
                current,
                target,
                actual,
                result,
                expected
            );
        }
    }

    #[test]
    fn test_negative_inputs_propagate() {
        assert!(compute_corrected_flow_rate(30.0, -100.0, 100.0) < 0.0);
        assert!(compute_corrected_flow_rate(30.0, 100.0, -100.0) < 0.0);
    }

    #[test]
    fn test_zero_current_flow_rate() {
        assert_eq!(compute_corrected_flow_rate(0.0, 100.0, 100.0), 0.0);
    }

    #[test]
    fn test_round_flow_rate() {
        let corrected = compute_corrected_flow_rate(30.0, 100.0, 95.0);
        assert!((round_flow_rate(corrected) - 31.58).abs() < 1e-9);

        let corrected = compute_corrected_flow_rate(30.123456, 100.0, 95.5);
        let rounded = round_flow_rate(corrected);
        assert!((rounded * 100.0 - (rounded * 100.0).round()).abs() < 1e-6);
        assert!((rounded - corrected).abs() <= 0.005 + 1e-9);
    }
}
