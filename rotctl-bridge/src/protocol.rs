use antenna_controller::{command::Degrees, parse_degrees};

/// One request line from a rotctl client.
#[derive(Debug, Clone, PartialEq)]
pub enum RotctlRequest {
    /// `p`
    GetPosition,
    /// `P <az> <el>`, either `.` or `,` as decimal separator.
    SetPosition {
        azimuth: Degrees,
        elevation: Degrees,
    },
    /// `S` or `q`
    Terminate,
    /// Anything else. rotctl clients expect silence for these.
    Malformed,
}

impl RotctlRequest {
    pub fn parse(line: &str) -> Self {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens.as_slice() {
            ["p"] => RotctlRequest::GetPosition,
            ["S"] | ["q"] => RotctlRequest::Terminate,
            ["P", azimuth, elevation] => match (parse_degrees(azimuth), parse_degrees(elevation)) {
                (Ok(azimuth), Ok(elevation)) => RotctlRequest::SetPosition { azimuth, elevation },
                _ => RotctlRequest::Malformed,
            },
            _ => RotctlRequest::Malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_position() {
        assert_eq!(RotctlRequest::parse("p"), RotctlRequest::GetPosition);
        assert_eq!(RotctlRequest::parse("p\r\n"), RotctlRequest::GetPosition);
    }

    #[test]
    fn test_set_position() {
        assert_eq!(
            RotctlRequest::parse("P 45.0 30.0"),
            RotctlRequest::SetPosition {
                azimuth: 45.0,
                elevation: 30.0
            }
        );
        assert_eq!(
            RotctlRequest::parse("P 10,5 20,5"),
            RotctlRequest::parse("P 10.5 20.5")
        );
        assert_eq!(
            RotctlRequest::parse("P  180   -1,25\n"),
            RotctlRequest::SetPosition {
                azimuth: 180.0,
                elevation: -1.25
            }
        );
    }

    #[test]
    fn test_terminate() {
        assert_eq!(RotctlRequest::parse("S"), RotctlRequest::Terminate);
        assert_eq!(RotctlRequest::parse("q"), RotctlRequest::Terminate);
    }

    #[test]
    fn test_malformed() {
        for line in [
            "",
            "P 10",
            "P 10 20 30",
            "P north 20",
            "P 10 up",
            "p 10",
            "get_pos",
            "\\get_pos",
            "Q",
            "P10 20",
        ] {
            assert_eq!(RotctlRequest::parse(line), RotctlRequest::Malformed, "{line:?}");
        }
    }
}
