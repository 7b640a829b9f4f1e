//! HTML rendering of an order for the notification email.

use crate::order::{text_or, FieldValue, OrderSubmission};

/// Escapes the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the order summary sent to the shop owner.
///
/// Every submitted value is escaped. Missing optional values render empty,
/// except quantity (`1`) and engraving (`No`).
pub fn order_html(order: &OrderSubmission) -> String {
    let field = |value: &Option<FieldValue>, default: &str| escape_html(&text_or(value, default));

    format!(
        "<h2>New Order from {name}</h2>\n\
         <p><strong>Contact Number:</strong> {phone}</p>\n\
         <p><strong>Email:</strong> {email}</p>\n\
         <p><strong>Address:</strong> {address}, {barangay}, {city}, {province} {postcode}</p>\n\
         <h3>Order Details</h3>\n\
         <p><strong>Type:</strong> {jewelry_type}</p>\n\
         <p><strong>Quantity:</strong> {quantity}</p>\n\
         <p><strong>Engraving:</strong> {engraving}</p>\n\
         <p><strong>Payment Method:</strong> {payment_method}</p>\n\
         <p><strong>Shipping Option:</strong> {shipping_option}</p>\n\
         <p><strong>Notes:</strong> {notes}</p>\n",
        name = field(&order.name, ""),
        phone = field(&order.phone, ""),
        email = field(&order.email, ""),
        address = field(&order.address, ""),
        barangay = field(&order.barangay, ""),
        city = field(&order.city, ""),
        province = field(&order.province, ""),
        postcode = field(&order.postcode, ""),
        jewelry_type = field(&order.jewelry_type, ""),
        quantity = field(&order.quantity, "1"),
        engraving = field(&order.engraving, "No"),
        payment_method = field(&order.payment_method, ""),
        shipping_option = field(&order.shipping_option, ""),
        notes = field(&order.notes, ""),
    )
}

/// Subject line for the notification. Header encoding is left to the mailer.
pub fn subject(order: &OrderSubmission) -> String {
    format!(
        "New order from {} - {}",
        text_or(&order.name, ""),
        text_or(&order.jewelry_type, "")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> OrderSubmission {
        OrderSubmission {
            name: Some("Ana".into()),
            phone: Some("555".into()),
            email: Some("a@b.com".into()),
            address: Some("1 St".into()),
            city: Some("Metro".into()),
            province: Some("P".into()),
            postcode: Some("1000".into()),
            jewelry_type: Some("Ring".into()),
            ..Default::default()
        }
    }

    #[test]
    fn escapes_all_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn ampersand_is_escaped_once() {
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }

    #[test]
    fn script_tags_never_survive() {
        let order = OrderSubmission {
            name: Some("<script>alert(1)</script>".into()),
            notes: Some("<script>steal()</script>".into()),
            ..order()
        };
        let html = order_html(&order);

        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("&lt;script&gt;steal()&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn quantity_and_engraving_have_defaults() {
        let html = order_html(&order());

        assert!(html.contains("<p><strong>Quantity:</strong> 1</p>"));
        assert!(html.contains("<p><strong>Engraving:</strong> No</p>"));
        assert!(html.contains("<p><strong>Payment Method:</strong> </p>"));
        assert!(html.contains("<p><strong>Notes:</strong> </p>"));
    }

    #[test]
    fn renders_supplied_optional_values() {
        let order = OrderSubmission {
            barangay: Some("San Roque".into()),
            quantity: Some(FieldValue::Number(2.into())),
            engraving: Some("A & B".into()),
            ..order()
        };
        let html = order_html(&order);

        assert!(html.contains(
            "<p><strong>Address:</strong> 1 St, San Roque, Metro, P 1000</p>"
        ));
        assert!(html.contains("<p><strong>Quantity:</strong> 2</p>"));
        assert!(html.contains("<p><strong>Engraving:</strong> A &amp; B</p>"));
    }

    #[test]
    fn empty_barangay_leaves_gap_in_address() {
        let html = order_html(&order());
        assert!(html.contains("<p><strong>Address:</strong> 1 St, , Metro, P 1000</p>"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let order = order();
        assert_eq!(order_html(&order), order_html(&order));
    }

    #[test]
    fn subject_uses_name_and_type() {
        assert_eq!(subject(&order()), "New order from Ana - Ring");
    }
}
