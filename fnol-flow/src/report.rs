//! Deterministic serialization of a [`FormSnapshot`] into the fixed email
//! body layout. Empty fields are omitted; multi-line descriptions are
//! reflowed so continuation lines align under their label.

use chrono::NaiveDate;

use crate::model::{Address, FormSnapshot, LossLocation, Party};

/// Continuation lines of the loss description align under "Description: ".
const DESCRIPTION_INDENT: usize = 21;
const AUTHORITY_DESCRIPTION_INDENT: usize = 22;

/// `MM-DD-YYYY`, the format used in both the body and the subject line.
pub fn format_date_us(date: NaiveDate) -> String {
    date.format("%m-%d-%Y").to_string()
}

/// Rejoin `text` so every line after the first is prefixed with `indent`
/// spaces.
pub fn indent_text(text: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    text.split('\n').collect::<Vec<_>>().join(&format!("\n{pad}"))
}

/// Drop the header (reference) line; the remainder is what the
/// confirmation page shows and what goes to the clipboard.
pub fn clip_header(body: &str) -> &str {
    body.find('\n').map_or(body, |i| &body[i + 1..])
}

fn push_field(out: &mut String, indent: &str, label: &str, value: &str) {
    if !value.is_empty() {
        out.push_str(indent);
        out.push_str(label);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
}

fn push_address(out: &mut String, indent: &str, address: &Address) {
    push_field(out, indent, "Address 1", &address.address_one);
    push_field(out, indent, "Address 2", &address.address_two);
    push_field(out, indent, "City", &address.city);
    push_field(out, indent, "State", &address.state);
    push_field(out, indent, "Country", &address.country);
    push_field(out, indent, "Country Name", &address.custom_country);
    push_field(out, indent, "Postal Code", &address.postal_code);
}

// Reporter and insured contact list phone before email.
fn push_contact(out: &mut String, indent: &str, party: &Party) {
    push_field(out, indent, "Title", &party.title);
    push_field(out, indent, "First Name", &party.first_name);
    push_field(out, indent, "Last Name", &party.last_name);
    push_field(out, indent, "Phone", &party.phone);
    push_field(out, indent, "Email", &party.email);
    push_address(out, indent, &party.address);
}

// Witnesses and claimants list email before phone.
fn push_person(out: &mut String, indent: &str, party: &Party) {
    push_field(out, indent, "Title", &party.title);
    push_field(out, indent, "First Name", &party.first_name);
    push_field(out, indent, "Last Name", &party.last_name);
    push_field(out, indent, "Email", &party.email);
    push_field(out, indent, "Phone", &party.phone);
    push_address(out, indent, &party.address);
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// Build the full email body for a submitted snapshot. The first line
/// carries the session reference and is later clipped for display.
pub fn build_email_body(reference: &str, form: &FormSnapshot) -> String {
    let mut body = format!("Generated by Claims FNOL Portal - Reference: {reference}.\n");

    body.push_str("Reported by:\n");
    push_field(
        &mut body,
        "  ",
        "Role in Relation to Loss",
        &form.reporter.relation_to_insured,
    );
    push_contact(&mut body, "  ", &form.reporter.party);

    body.push('\n');
    body.push_str("Insured Policy Information:\n");
    body.push_str(&format!("  Policy Number: {}\n", form.policy.policy_number));
    if form.policy.contact_same_as_reporter {
        body.push_str("  Same Contact and Address as Reported by: Yes\n");
    } else {
        push_contact(&mut body, "  ", &form.policy.contact);
    }

    body.push('\n');
    body.push_str("Loss Information:\n");
    body.push_str(&format!("  Date: {}\n", format_date_us(form.loss.date)));
    body.push_str(&format!(
        "  Description: {}\n",
        indent_text(&form.loss.description, DESCRIPTION_INDENT)
    ));
    match &form.loss.location {
        LossLocation::SameAsReporter => {
            body.push_str("  loss location: Same as Reported by\n");
        }
        LossLocation::SameAsInsured => {
            body.push_str("  loss location: Same as Insured\n");
        }
        LossLocation::Other(address) => {
            push_address(&mut body, "  ", address);
        }
    }

    body.push_str(&format!(
        "  Were Authorities Notified?: {}\n",
        yes_no(form.loss.authorities_notified)
    ));
    if form.loss.authorities_notified {
        if let Some(authority) = &form.loss.authority {
            push_field(&mut body, "    ", "Type", &authority.kind);
            push_field(&mut body, "    ", "Report Number", &authority.report_number);
            if !authority.additional_information.is_empty() {
                body.push_str(&format!(
                    "    Description: {}\n",
                    indent_text(
                        &authority.additional_information,
                        AUTHORITY_DESCRIPTION_INDENT
                    )
                ));
            }
        }
    }

    body.push_str(&format!(
        "  Any Witness of Loss: {}\n",
        yes_no(form.loss.has_witnesses())
    ));
    for (index, witness) in form.loss.witnesses.iter().enumerate() {
        body.push_str(&format!("  Witness {}:\n", index + 1));
        push_person(&mut body, "    ", witness);
    }

    body.push('\n');
    body.push_str("Claimant Information:\n");
    for (index, claimant) in form.claimants.iter().enumerate() {
        body.push_str(&format!("  Claimant {}:\n", index + 1));
        push_person(&mut body, "    ", claimant);
    }

    body
}
