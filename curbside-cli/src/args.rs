use anyhow::{Result, bail};

pub(crate) const USAGE: &str = "usage: curbside <email> <password>";

/// Credentials taken from the command line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Credentials {
    pub email: String,
    pub password: String,
}

pub(crate) fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Credentials> {
    let mut args = args.into_iter().skip(1);

    let (Some(email), Some(password), None) = (args.next(), args.next(), args.next()) else {
        bail!(USAGE);
    };

    if email.trim().is_empty() || password.is_empty() {
        bail!(USAGE);
    }

    Ok(Credentials {
        email: email.trim().to_owned(),
        password,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| (*item).to_owned()).collect()
    }

    #[test]
    fn test_parse_email_and_password() {
        let creds = parse_args(argv(&["curbside", " me@example.com ", "pw"])).unwrap();
        assert_eq!(
            creds,
            Credentials {
                email: "me@example.com".to_owned(),
                password: "pw".to_owned(),
            }
        );
    }

    #[test]
    fn test_wrong_arity() {
        assert!(parse_args(argv(&["curbside"])).is_err());
        assert!(parse_args(argv(&["curbside", "me@example.com"])).is_err());
        assert!(parse_args(argv(&["curbside", "a", "b", "c"])).is_err());
        assert!(parse_args(argv(&["curbside", "", "pw"])).is_err());
    }
}
