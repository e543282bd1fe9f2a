/// Interior local maxima of `values`, the way scipy's plain `find_peaks` reports them.
///
/// A sample is a peak when it is strictly greater than both neighbours. A flat
/// plateau counts once, at its middle index (rounded down). The first and last
/// samples are never peaks.
pub fn find_peaks(values: &[f32]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if values.len() < 3 {
        return peaks;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                let plateau_end = ahead - 1;
                peaks.push((i + plateau_end) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_interior_maxima_only() {
        assert_eq!(find_peaks(&[5.0, 1.0, 3.0, 1.0, 4.0, 2.0, 9.0]), vec![2, 4]);
    }

    #[test]
    fn plateau_reports_middle_index() {
        assert_eq!(find_peaks(&[0.0, 2.0, 2.0, 2.0, 2.0, 0.0]), vec![2]);
        assert_eq!(find_peaks(&[0.0, 2.0, 2.0, 2.0, 0.0]), vec![2]);
    }

    #[test]
    fn plateau_running_into_edge_is_not_a_peak() {
        assert!(find_peaks(&[0.0, 1.0, 2.0, 2.0]).is_empty());
        assert!(find_peaks(&[1.0, 1.0, 1.0]).is_empty());
    }

    #[test]
    fn short_input_has_no_peaks() {
        assert!(find_peaks(&[]).is_empty());
        assert!(find_peaks(&[1.0, 2.0]).is_empty());
    }
}
