//! QBF instance files.
//!
//! A whitespace-delimited stream of numbers: the dimension `n`, followed by
//! the upper triangle of `A` (diagonal included) in row-major order, i.e.
//! `A[0][0..n]`, `A[1][1..n]`, ..., `A[n-1][n-1]`. Line breaks carry no
//! meaning and tokens past the last coefficient are ignored.

use std::io::Read;
use std::path::Path;

use super::model::QbfModel;
use crate::error::{QbfError, Result};

/// Reader for QBF instance files.
#[derive(Debug)]
pub struct InstanceParser;

impl InstanceParser {
    /// Reads and parses an instance file.
    pub fn load(path: impl AsRef<Path>) -> Result<QbfModel> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| QbfError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), size = model.size(), "loaded instance");
        Ok(model)
    }

    /// Parses an instance from any reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<QbfModel> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|source| QbfError::Io {
                path: "<reader>".into(),
                source,
            })?;
        Self::parse(&content)
    }

    /// Parses instance text.
    pub fn parse(content: &str) -> Result<QbfModel> {
        let mut tokens = content.split_whitespace();

        let size = match tokens.next() {
            None => return Err(QbfError::InvalidDimension("empty instance".into())),
            Some(token) => parse_dimension(token)?,
        };

        let expected = triangle_len(size).ok_or_else(|| {
            QbfError::InvalidDimension(format!("size {size} is too large"))
        })?;
        let mut upper = Vec::new();
        for (offset, token) in tokens.take(expected).enumerate() {
            let value: f64 = token.parse().map_err(|_| QbfError::Parse {
                position: offset + 1,
                token: token.to_string(),
            })?;
            upper.push(value);
        }

        if upper.len() < expected {
            return Err(QbfError::Truncated {
                expected,
                found: upper.len(),
            });
        }

        QbfModel::from_upper_triangle(size, &upper)
    }
}

/// `n(n+1)/2`, or `None` on overflow.
fn triangle_len(size: usize) -> Option<usize> {
    size.checked_add(1)?.checked_mul(size).map(|len| len / 2)
}

/// The dimension may be written as an integer or an integral float (`20.0`).
fn parse_dimension(token: &str) -> Result<usize> {
    if let Ok(n) = token.parse::<usize>() {
        if n == 0 {
            return Err(QbfError::InvalidDimension("size must be positive".into()));
        }
        return Ok(n);
    }
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 1.0 && v.fract() == 0.0 => Ok(v as usize),
        Ok(_) => Err(QbfError::InvalidDimension(format!(
            "{token:?} is not a positive integer"
        ))),
        Err(_) => Err(QbfError::Parse {
            position: 0,
            token: token.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upper_triangle() {
        let model = InstanceParser::parse("3\n1 -2 3\n4 5\n-6\n").unwrap();
        assert_eq!(model.size(), 3);
        assert_eq!(model.coefficient(0, 2), 3.0);
        assert_eq!(model.coefficient(2, 0), 0.0);
        assert_eq!(model.coefficient(1, 2), 5.0);
        assert_eq!(model.coefficient(2, 2), -6.0);
    }

    #[test]
    fn test_layout_is_whitespace_agnostic() {
        let a = InstanceParser::parse("2 1 2 3").unwrap();
        let b = InstanceParser::parse("2\n\n1\t2\n   3\n").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_integral_float_dimension() {
        let model = InstanceParser::parse("2.0 1 1 1").unwrap();
        assert_eq!(model.size(), 2);
    }

    #[test]
    fn test_trailing_tokens_ignored() {
        let model = InstanceParser::parse("1 7 garbage").unwrap();
        assert_eq!(model.coefficient(0, 0), 7.0);
    }

    #[test]
    fn test_rejects_zero_and_negative_dimension() {
        assert!(matches!(
            InstanceParser::parse("0"),
            Err(QbfError::InvalidDimension(_))
        ));
        assert!(matches!(
            InstanceParser::parse("-3 1 2"),
            Err(QbfError::InvalidDimension(_))
        ));
        assert!(matches!(
            InstanceParser::parse("2.5 1 1 1"),
            Err(QbfError::InvalidDimension(_))
        ));
        assert!(matches!(
            InstanceParser::parse("   "),
            Err(QbfError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_rejects_truncated_stream() {
        let err = InstanceParser::parse("3 1 2 3 4").unwrap_err();
        assert!(matches!(
            err,
            QbfError::Truncated {
                expected: 6,
                found: 4
            }
        ));
    }

    #[test]
    fn test_huge_dimension_with_few_tokens_is_truncated() {
        let err = InstanceParser::parse("100000000 1 2 3").unwrap_err();
        assert!(matches!(
            err,
            QbfError::Truncated {
                expected: 5_000_000_050_000_000,
                found: 3
            }
        ));
    }

    #[test]
    fn test_dimension_overflowing_triangle_size() {
        let huge = format!("{} 1 2", usize::MAX);
        assert!(matches!(
            InstanceParser::parse(&huge),
            Err(QbfError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_reports_bad_token_position() {
        let err = InstanceParser::parse("2 1 x 3").unwrap_err();
        match err {
            QbfError::Parse { position, token } => {
                assert_eq!(position, 2);
                assert_eq!(token, "x");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = InstanceParser::load("/nonexistent/qbf-instance").unwrap_err();
        assert!(matches!(err, QbfError::Io { .. }));
    }

    #[test]
    fn test_from_reader() {
        let model = InstanceParser::from_reader("2 1 0 1".as_bytes()).unwrap();
        assert_eq!(model.size(), 2);
    }
}
