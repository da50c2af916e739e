//! RepairShopr customer records as returned by the external API
//!
//! Only the fields the import pipeline reads are modelled; unknown fields are
//! ignored by serde.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// RepairShopr customer
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Customer {
    pub id: i64,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address_2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    /// Present when requested with `include_tickets=true`
    #[serde(default)]
    pub tickets: Option<Vec<Ticket>>,
}

/// Service ticket attached to a customer
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Ticket {
    pub id: i64,
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Option<Vec<TicketComment>>,
}

/// Technician comment on a ticket
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TicketComment {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// `GET /customers` response envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomersPage {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

/// Pagination metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageMeta {
    pub total_pages: Option<u64>,
    pub total_entries: Option<u64>,
    pub per_page: Option<u64>,
    pub page: Option<u64>,
}

/// `GET /customers/count` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomerCount {
    pub count: u64,
}

/// `GET /tickets` response envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketsPage {
    #[serde(default)]
    pub tickets: Vec<Ticket>,
}

impl Customer {
    /// Identifier used in error reports
    pub fn record_id(&self) -> String {
        self.id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_deserializes_with_nested_tickets() {
        let json = serde_json::json!({
            "customers": [{
                "id": 42,
                "firstname": "Tan",
                "lastname": "Wei Ming",
                "email": "tan@example.com",
                "unused_field": true,
                "tickets": [{
                    "id": 7,
                    "created_at": "2024-03-01T10:00:00Z",
                    "comments": [{ "body": "Chemical wash done" }]
                }]
            }],
            "meta": { "total_pages": 3, "total_entries": 120, "per_page": 50, "page": 1 }
        });

        let page: CustomersPage = serde_json::from_value(json).unwrap();
        assert_eq!(page.customers.len(), 1);

        let customer = &page.customers[0];
        assert_eq!(customer.record_id(), "42");
        let tickets = customer.tickets.as_ref().unwrap();
        assert_eq!(
            tickets[0].comments.as_ref().unwrap()[0].body.as_deref(),
            Some("Chemical wash done")
        );
        assert_eq!(page.meta.unwrap().total_entries, Some(120));
    }

    #[test]
    fn test_sparse_customer_deserializes() {
        let customer: Customer = serde_json::from_value(serde_json::json!({ "id": 1 })).unwrap();
        assert!(customer.firstname.is_none());
        assert!(customer.tickets.is_none());
    }
}
