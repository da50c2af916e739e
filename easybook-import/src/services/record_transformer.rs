//! RepairShopr customer → internal user transformation
//!
//! Derives the service-report excerpt and AMC membership, then validates the
//! assembled record against the user schema.

use crate::models::{AmcStatus, Customer, ImportedUser, Ticket, UserDraft, ValidationError};

/// Most recent ticket: latest `created_at`, else the first listed
///
/// RepairShopr lists tickets newest first, so the first ticket wins when
/// timestamps are missing or tied.
fn most_recent_ticket(tickets: &[Ticket]) -> Option<&Ticket> {
    let mut latest: Option<&Ticket> = None;
    for ticket in tickets {
        latest = match latest {
            None => Some(ticket),
            Some(current) if ticket.created_at > current.created_at => Some(ticket),
            keep => keep,
        };
    }
    latest
}

/// First comment body of the most recent ticket, empty when absent
pub fn extract_service_report(tickets: &[Ticket]) -> String {
    most_recent_ticket(tickets)
        .and_then(|t| t.comments.as_ref())
        .and_then(|comments| comments.first())
        .and_then(|c| c.body.clone())
        .unwrap_or_default()
}

/// `active` when the last name contains "amc" (any case), else `inactive`
pub fn derive_amc_status(last_name: &str) -> AmcStatus {
    if last_name.to_lowercase().contains("amc") {
        AmcStatus::Active
    } else {
        AmcStatus::Inactive
    }
}

/// Street, unit, city, state and postcode joined with ", "
fn compose_address(customer: &Customer) -> Option<String> {
    let parts: Vec<&str> = [
        &customer.address,
        &customer.address_2,
        &customer.city,
        &customer.state,
        &customer.zip,
    ]
    .into_iter()
    .filter_map(|p| p.as_deref())
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Map and validate one external customer
pub fn transform_customer(customer: &Customer) -> Result<ImportedUser, ValidationError> {
    let last_name = customer.lastname.clone().unwrap_or_default();
    let service_report = extract_service_report(customer.tickets.as_deref().unwrap_or_default());

    let draft = UserDraft {
        first_name: customer.firstname.clone().unwrap_or_default(),
        amc_status: Some(derive_amc_status(&last_name)),
        last_name,
        email: customer.email.clone().unwrap_or_default(),
        phone: customer.phone.clone().or_else(|| customer.mobile.clone()),
        address: compose_address(customer),
        service_report: Some(service_report),
    };

    ImportedUser::validate(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TicketComment;
    use chrono::{TimeZone, Utc};

    fn comment(body: &str) -> TicketComment {
        TicketComment {
            body: Some(body.to_string()),
            created_at: None,
        }
    }

    fn ticket(id: i64, day: Option<u32>, comments: Vec<TicketComment>) -> Ticket {
        Ticket {
            id,
            created_at: day.map(|d| Utc.with_ymd_and_hms(2024, 5, d, 9, 0, 0).unwrap()),
            comments: Some(comments),
            ..Default::default()
        }
    }

    fn customer(last_name: &str) -> Customer {
        Customer {
            id: 77,
            firstname: Some("Nur".to_string()),
            lastname: Some(last_name.to_string()),
            email: Some("nur@example.com".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_amc_detection_is_case_insensitive() {
        assert_eq!(derive_amc_status("Tan AMC"), AmcStatus::Active);
        assert_eq!(derive_amc_status("tan (amc)"), AmcStatus::Active);
        assert_eq!(derive_amc_status("Camcorder"), AmcStatus::Active);
        assert_eq!(derive_amc_status("Tan"), AmcStatus::Inactive);
        assert_eq!(derive_amc_status(""), AmcStatus::Inactive);
    }

    #[test]
    fn test_service_report_uses_latest_ticket_first_comment() {
        let tickets = vec![
            ticket(1, Some(2), vec![comment("Old visit")]),
            ticket(2, Some(20), vec![comment("Gas top-up"), comment("Follow-up call")]),
            ticket(3, Some(10), vec![comment("Middle visit")]),
        ];
        assert_eq!(extract_service_report(&tickets), "Gas top-up");
    }

    #[test]
    fn test_service_report_without_timestamps_takes_first_ticket() {
        let tickets = vec![
            ticket(1, None, vec![comment("Newest")]),
            ticket(2, None, vec![comment("Older")]),
        ];
        assert_eq!(extract_service_report(&tickets), "Newest");
    }

    #[test]
    fn test_service_report_empty_when_absent() {
        assert_eq!(extract_service_report(&[]), "");
        assert_eq!(extract_service_report(&[ticket(1, Some(1), vec![])]), "");
    }

    #[test]
    fn test_transform_maps_fields() {
        let mut source = customer("Lim amc");
        source.mobile = Some("+65 9123 4567".to_string());
        source.address = Some("10 Tampines Ave".to_string());
        source.address_2 = Some("#05-12".to_string());
        source.zip = Some("520010".to_string());
        source.tickets = Some(vec![ticket(5, Some(3), vec![comment("Aircon servicing x3")])]);

        let user = transform_customer(&source).unwrap();
        assert_eq!(user.first_name, "Nur");
        assert_eq!(user.amc_status, AmcStatus::Active);
        assert_eq!(user.phone.as_deref(), Some("+65 9123 4567"));
        assert_eq!(user.address.as_deref(), Some("10 Tampines Ave, #05-12, 520010"));
        assert_eq!(user.service_report.as_deref(), Some("Aircon servicing x3"));
    }

    #[test]
    fn test_transform_rejects_missing_email() {
        let mut source = customer("Lim");
        source.email = None;
        assert_eq!(
            transform_customer(&source).unwrap_err(),
            ValidationError::MissingEmail
        );

        source.email = Some("not-an-email".to_string());
        assert!(matches!(
            transform_customer(&source).unwrap_err(),
            ValidationError::InvalidEmail(_)
        ));
    }
}
