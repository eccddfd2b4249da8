//! Tokenizer for `Set-Cookie` header values.
//!
//! Loosely modeled on Chromium's `net::ParsedCookie`, but lenient: a line
//! never fails to parse. Segments that make no sense are handed to the
//! caller as-is and attributes it does not understand are ignored there.

use time::format_description::well_known::Rfc2822;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// A `Set-Cookie` value split into its name/value pair and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCookie<'a> {
    pub name: &'a str,
    pub value: &'a str,
    attributes: Vec<(&'a str, &'a str)>,
}

impl<'a> ParsedCookie<'a> {
    /// Split `line` on `;`. The first segment is the `name=value` pair,
    /// every later segment an attribute. A segment without `=` yields an
    /// empty value (`Secure`, `HttpOnly`, or a malformed pair).
    pub fn parse(line: &'a str) -> Self {
        let mut segments = line.split(';').map(str::trim);
        let (name, value) = segments.next().map(split_pair).unwrap_or(("", ""));
        let attributes = segments
            .filter(|segment| !segment.is_empty())
            .map(split_pair)
            .collect();

        Self {
            name,
            value,
            attributes,
        }
    }

    /// Attributes in header order, names as written.
    pub fn attributes(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.attributes.iter().copied()
    }
}

fn split_pair(segment: &str) -> (&str, &str) {
    match segment.split_once('=') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (segment, ""),
    }
}

/// Parse an `Expires` attribute value.
///
/// Accepts the three HTTP-date forms (IMF-fixdate, RFC 850, asctime), the
/// Netscape form `Wdy, DD-Mon-YYYY HH:MM:SS GMT` still sent by many
/// servers (also with a two-digit year), and RFC 2822 with a numeric
/// offset. `UTC` is accepted in place of `GMT`. Anything else is `None`.
pub fn parse_cookie_date(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();

    if let Ok(time) = httpdate::parse_http_date(value) {
        return Some(OffsetDateTime::from(time));
    }

    let value = normalize_date(value);
    if let Ok(time) = httpdate::parse_http_date(&value) {
        return Some(OffsetDateTime::from(time));
    }

    let netscape = format_description!(
        "[weekday repr:short], [day]-[month repr:short]-[year] [hour]:[minute]:[second] GMT"
    );
    if let Ok(time) = PrimitiveDateTime::parse(&value, netscape) {
        return Some(time.assume_utc());
    }

    OffsetDateTime::parse(&value, &Rfc2822).ok()
}

/// Rewrite a `UTC` zone name to `GMT` and widen a two-digit year in a
/// dashed date (`70`-`99` are 19xx, `00`-`69` are 20xx, per RFC 6265).
fn normalize_date(value: &str) -> String {
    let mut tokens: Vec<String> = value.split_whitespace().map(str::to_string).collect();

    if let Some(zone) = tokens.last_mut() {
        if zone.eq_ignore_ascii_case("UTC") {
            *zone = "GMT".to_string();
        }
    }

    if let Some(date) = tokens.get_mut(1) {
        let widened = date.rsplit_once('-').and_then(|(day_month, year)| {
            if year.len() != 2 {
                return None;
            }
            let yy: u8 = year.parse().ok()?;
            let century = if yy >= 70 { 19 } else { 20 };
            Some(format!("{}-{}{}", day_month, century, year))
        });
        if let Some(widened) = widened {
            *date = widened;
        }
    }

    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_parse_pair_and_attributes() {
        let parsed = ParsedCookie::parse("sid=abc; Path=/w; Secure;HttpOnly");
        assert_eq!(parsed.name, "sid");
        assert_eq!(parsed.value, "abc");

        let attrs: Vec<_> = parsed.attributes().collect();
        assert_eq!(attrs, vec![("Path", "/w"), ("Secure", ""), ("HttpOnly", "")]);
    }

    #[test]
    fn test_value_split_on_first_equals() {
        let parsed = ParsedCookie::parse("token=a=b=c; Path=/");
        assert_eq!(parsed.name, "token");
        assert_eq!(parsed.value, "a=b=c");
    }

    #[test]
    fn test_missing_equals_in_pair() {
        let parsed = ParsedCookie::parse("garbage; Secure");
        assert_eq!(parsed.name, "garbage");
        assert_eq!(parsed.value, "");
        assert_eq!(parsed.attributes().count(), 1);
    }

    #[test]
    fn test_empty_line() {
        let parsed = ParsedCookie::parse("");
        assert_eq!(parsed.name, "");
        assert_eq!(parsed.value, "");
        assert_eq!(parsed.attributes().count(), 0);
    }

    #[test]
    fn test_trailing_semicolon_ignored() {
        let parsed = ParsedCookie::parse("a=b;");
        assert_eq!(parsed.attributes().count(), 0);
    }

    #[test]
    fn test_date_imf_fixdate() {
        let parsed = parse_cookie_date("Thu, 01 Jan 1970 00:00:10 GMT");
        assert_eq!(parsed, Some(datetime!(1970-01-01 00:00:10 UTC)));
    }

    #[test]
    fn test_date_netscape_dashes() {
        let parsed = parse_cookie_date("Wed, 21-Oct-2015 07:28:00 GMT");
        assert_eq!(parsed, Some(datetime!(2015-10-21 07:28:00 UTC)));
    }

    #[test]
    fn test_date_numeric_offset() {
        let parsed = parse_cookie_date("Wed, 21 Oct 2015 09:28:00 +0200");
        assert_eq!(parsed, Some(datetime!(2015-10-21 07:28:00 UTC)));
    }

    #[test]
    fn test_date_netscape_two_digit_year() {
        assert_eq!(
            parse_cookie_date("Wed, 21-Oct-15 07:28:00 GMT"),
            Some(datetime!(2015-10-21 07:28:00 UTC))
        );
        assert_eq!(
            parse_cookie_date("Thu, 01-Jan-70 00:00:01 GMT"),
            Some(datetime!(1970-01-01 00:00:01 UTC))
        );
    }

    #[test]
    fn test_date_utc_zone_name() {
        assert_eq!(
            parse_cookie_date("Sat, 01 Jan 2000 00:00:00 UTC"),
            Some(datetime!(2000-01-01 00:00:00 UTC))
        );
        assert_eq!(
            parse_cookie_date("Wed, 21-Oct-2015 07:28:00 UTC"),
            Some(datetime!(2015-10-21 07:28:00 UTC))
        );
    }

    #[test]
    fn test_date_rfc850_unchanged() {
        assert_eq!(
            parse_cookie_date("Wednesday, 21-Oct-15 07:28:00 GMT"),
            Some(datetime!(2015-10-21 07:28:00 UTC))
        );
    }

    #[test]
    fn test_date_garbage() {
        assert_eq!(parse_cookie_date("Invalid Date"), None);
        assert_eq!(parse_cookie_date(""), None);
        assert_eq!(parse_cookie_date("tomorrow"), None);
    }
}
