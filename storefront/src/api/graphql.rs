//! GraphQL client for the events API

use super::{ApiError, ApiFuture, EventsApi};
use crate::config::StorefrontConfig;
use crate::types::{Event, EventId, PurchaseReceipt};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

const EVENTS_QUERY: &str = r"
  query GetEvents {
    getEvents {
      id
      name
      date
      location
      description
      price
      ticketsAvailable
      image
    }
  }
";

const PURCHASE_TICKETS_MUTATION: &str = r"
  mutation PurchaseTickets($eventId: String!, $quantity: Float!) {
    purchaseTickets(eventId: $eventId, quantity: $quantity) {
      orderNumber
      event {
        id
        name
        date
        location
        description
        price
        ticketsAvailable
        image
      }
      quantity
    }
  }
";

/// A GraphQL response envelope
#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetEventsData {
    get_events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PurchaseTicketsData {
    purchase_tickets: PurchaseReceipt,
}

/// Events API client speaking GraphQL over HTTP POST
#[derive(Clone, Debug)]
pub struct GraphQlEventsApi {
    client: Client,
    endpoint: String,
}

impl GraphQlEventsApi {
    /// Create a client for `endpoint` with no request timeout
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.api_url.clone(),
        })
    }

    /// The endpoint requests are posted to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post one GraphQL operation and decode its `data`
    ///
    /// The body is decoded whatever the HTTP status, since GraphQL servers
    /// report errors with 200 and 4xx alike. A status error is reported only
    /// when the body is not a GraphQL response.
    async fn execute<T>(&self, query: &str, variables: Option<Value>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let body = match variables {
            Some(variables) => json!({ "query": query, "variables": variables }),
            None => json!({ "query": query }),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let envelope: GraphQlResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                });
            },
            Err(e) => return Err(ApiError::Decode(e.to_string())),
        };

        if let Some(first) = envelope.errors.into_iter().next() {
            return Err(ApiError::Remote(first.message));
        }

        envelope
            .data
            .ok_or_else(|| ApiError::Decode("response carried neither data nor errors".to_string()))
    }
}

impl EventsApi for GraphQlEventsApi {
    fn fetch_events(&self) -> ApiFuture<'_, Vec<Event>> {
        Box::pin(async move {
            tracing::debug!(endpoint = %self.endpoint, "Querying events");
            let data: GetEventsData = self.execute(EVENTS_QUERY, None).await?;
            Ok(data.get_events)
        })
    }

    fn purchase_tickets(
        &self,
        event_id: &EventId,
        quantity: u32,
    ) -> ApiFuture<'_, PurchaseReceipt> {
        let variables = json!({
            "eventId": event_id.as_str(),
            "quantity": f64::from(quantity),
        });

        Box::pin(async move {
            tracing::debug!(endpoint = %self.endpoint, "Submitting purchase");
            let data: PurchaseTicketsData = self
                .execute(PURCHASE_TICKETS_MUTATION, Some(variables))
                .await?;
            Ok(data.purchase_tickets)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn client_from_config_uses_endpoint() {
        let config = StorefrontConfig {
            api_url: "http://events.test/graphql".to_string(),
            request_timeout: Some(Duration::from_secs(5)),
            ..StorefrontConfig::default()
        };

        let api = GraphQlEventsApi::from_config(&config);
        assert_eq!(
            api.as_ref().map(GraphQlEventsApi::endpoint),
            Ok("http://events.test/graphql")
        );
    }
}
