use crate::errors::StreamwiseError;

/// Create a string of all available items.
pub fn items_to_strings(items: Vec<&str>) -> String {
    let mut s = String::new();
    for i in items {
        s.push_str(i);
        s.push_str(&String::from(", "));
    }
    s
}

pub fn fmt_vec_output(v: &[f64]) -> String {
    let mut res = String::new();
    if let Some(last) = v.len().checked_sub(1) {
        if last == 0 {
            return format!("{:.4}", v[0]);
        }
        for n in &v[..last] {
            res.push_str(format!("{:.4}", n).as_str());
            res.push_str(", ");
        }
        res.push_str(format!("{:.4}", &v[last]).as_str());
    }
    res
}

// Validation
pub fn validate_positive_float_parameter(value: f64, parameter: &str) -> Result<(), StreamwiseError> {
    validate_float_parameter(value, 0.0, f64::INFINITY, parameter)
}

pub fn validate_float_parameter(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), StreamwiseError> {
    if value.is_nan() || value < min || max < value {
        let ex_msg = format!("real value within range {} and {}", min, max);
        Err(StreamwiseError::InvalidParameter(
            parameter.to_string(),
            ex_msg,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Open interval check, both bounds excluded.
pub fn validate_open_interval(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), StreamwiseError> {
    if value.is_nan() || value <= min || max <= value {
        Err(StreamwiseError::InvalidParameter(
            parameter.to_string(),
            format!("real value strictly between {} and {}", min, max),
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn validate_positive_usize_parameter(value: usize, parameter: &str) -> Result<(), StreamwiseError> {
    if value == 0 {
        Err(StreamwiseError::InvalidParameter(
            parameter.to_string(),
            "an integer greater than 0".to_string(),
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Check the feature count of an instance against the expected one.
#[inline]
pub fn check_dimension(expected: Option<usize>, x: &[f64]) -> Result<(), StreamwiseError> {
    match expected {
        Some(n) if n != x.len() => Err(StreamwiseError::DimensionMismatch {
            expected: n,
            found: x.len(),
        }),
        _ => Ok(()),
    }
}

#[inline]
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[inline]
pub fn manhattan(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

#[inline]
pub fn precision_round(n: f64, precision: i32) -> f64 {
    let p = (10.0_f64).powi(precision);
    (n * p).round() / p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round() {
        assert_eq!(0.3, precision_round(0.3333, 1));
        assert_eq!(0.2343, precision_round(0.2343123123123, 4));
    }

    #[test]
    fn test_distances() {
        let a = [0., 0., 0.];
        let b = [3., 4., 0.];
        assert_eq!(squared_euclidean(&a, &b), 25.0);
        assert_eq!(manhattan(&a, &b), 7.0);
    }

    #[test]
    fn test_validation() {
        assert!(validate_float_parameter(0.5, 0.0, 1.0, "delta").is_ok());
        assert!(validate_float_parameter(f64::NAN, 0.0, 1.0, "delta").is_err());
        assert!(validate_open_interval(0.0, 0.0, 1.0, "delta").is_err());
        assert!(validate_open_interval(1.0, 0.0, 1.0, "delta").is_err());
        assert!(validate_positive_usize_parameter(0, "k").is_err());
        assert!(check_dimension(Some(3), &[1., 2.]).is_err());
        assert!(check_dimension(None, &[1., 2.]).is_ok());
    }

    #[test]
    fn test_fmt_vec_output() {
        assert_eq!(fmt_vec_output(&[1.0]), "1.0000");
        assert_eq!(fmt_vec_output(&[1.0, 0.5]), "1.0000, 0.5000");
        assert_eq!(fmt_vec_output(&[]), "");
    }
}
