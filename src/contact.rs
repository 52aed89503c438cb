/// Dialer link for the shelter's phone number. Numbers in the sheet are
/// written with spaces or dots ("03 27 00 00 00"); the URI wants none.
pub fn tel_link(number: &str) -> String {
    let compact: String = number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();
    format!("tel:{compact}")
}

/// Prefilled adoption enquiry mail for one animal.
pub fn mailto_link(address: &str, animal_name: &str) -> String {
    let subject = if animal_name.is_empty() {
        "Demande d'adoption".to_string()
    } else {
        format!("Adoption de {animal_name}")
    };
    format!("mailto:{address}?subject={}", encode_component(&subject))
}

// RFC 3986 unreserved characters stay literal, everything else is
// percent-encoded byte-wise.
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
