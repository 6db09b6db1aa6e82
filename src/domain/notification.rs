use std::collections::HashMap;

const TYPE_KEYS: [&str; 3] = ["notificationType", "pesapal_notification_type", "OrderNotificationType"];
const TRACKING_KEYS: [&str; 3] = [
    "transactionTrackingId",
    "pesapal_transaction_tracking_id",
    "OrderTrackingId",
];
const REFERENCE_KEYS: [&str; 3] = [
    "merchantReference",
    "pesapal_merchant_reference",
    "OrderMerchantReference",
];

const STATE_CHANGED: [&str; 2] = ["CHANGE", "IPNCHANGE"];

/// One inbound query parameter, remembering the key it arrived under so the
/// acknowledgment can echo it back the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpnParam {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpnNotification {
    pub notification_type: Option<IpnParam>,
    pub tracking_id: Option<IpnParam>,
    pub merchant_reference: Option<IpnParam>,
}

impl IpnNotification {
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        Self {
            notification_type: pick(params, &TYPE_KEYS),
            tracking_id: pick(params, &TRACKING_KEYS).filter(|p| !p.value.trim().is_empty()),
            merchant_reference: pick(params, &REFERENCE_KEYS),
        }
    }

    pub fn is_state_change(&self) -> bool {
        self.notification_type
            .as_ref()
            .map(|p| STATE_CHANGED.iter().any(|t| p.value.eq_ignore_ascii_case(t)))
            .unwrap_or(false)
    }

    /// Tracking id of a notification that should drive reconciliation.
    pub fn actionable_tracking_id(&self) -> Option<&str> {
        if !self.is_state_change() {
            return None;
        }
        self.tracking_id.as_ref().map(|p| p.value.as_str())
    }

    /// Query-string echo of the three parameters, values form-encoded again
    /// so a reference containing `&` or `=` cannot split the body.
    pub fn ack_body(&self) -> String {
        let pairs = [
            (&self.notification_type, TYPE_KEYS[1]),
            (&self.tracking_id, TRACKING_KEYS[1]),
            (&self.merchant_reference, REFERENCE_KEYS[1]),
        ]
        .into_iter()
        .map(|(param, default_key)| match param {
            Some(p) => (p.key.as_str(), p.value.as_str()),
            None => (default_key, ""),
        });

        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }
}

fn pick(params: &HashMap<String, String>, keys: &[&str]) -> Option<IpnParam> {
    keys.iter().find_map(|k| {
        params.get(*k).map(|v| IpnParam {
            key: (*k).to_string(),
            value: v.clone(),
        })
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpnAck {
    Ok,
    Echo(String),
}

impl IpnAck {
    pub fn body(&self) -> &str {
        match self {
            IpnAck::Ok => "OK",
            IpnAck::Echo(body) => body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn echoes_gateway_keys_verbatim() {
        let n = IpnNotification::from_query(&query(&[
            ("pesapal_notification_type", "CHANGE"),
            ("pesapal_transaction_tracking_id", "trk-1"),
            ("pesapal_merchant_reference", "ORD-1"),
        ]));
        assert!(n.is_state_change());
        assert_eq!(n.actionable_tracking_id(), Some("trk-1"));
        assert_eq!(
            n.ack_body(),
            "pesapal_notification_type=CHANGE&pesapal_transaction_tracking_id=trk-1&pesapal_merchant_reference=ORD-1"
        );
    }

    #[test]
    fn camel_case_keys_are_echoed_as_received() {
        let n = IpnNotification::from_query(&query(&[
            ("notificationType", "CHANGE"),
            ("transactionTrackingId", "trk-2"),
            ("merchantReference", "ORD-2"),
        ]));
        assert_eq!(
            n.ack_body(),
            "notificationType=CHANGE&transactionTrackingId=trk-2&merchantReference=ORD-2"
        );
    }

    #[test]
    fn v3_change_type_is_recognised() {
        let n = IpnNotification::from_query(&query(&[
            ("OrderNotificationType", "IPNCHANGE"),
            ("OrderTrackingId", "trk-3"),
        ]));
        assert_eq!(n.actionable_tracking_id(), Some("trk-3"));
    }

    #[test]
    fn unknown_type_is_not_actionable() {
        let n = IpnNotification::from_query(&query(&[
            ("pesapal_notification_type", "RECURRING"),
            ("pesapal_transaction_tracking_id", "trk-4"),
        ]));
        assert!(!n.is_state_change());
        assert_eq!(n.actionable_tracking_id(), None);
    }

    #[test]
    fn blank_tracking_id_is_not_actionable() {
        let n = IpnNotification::from_query(&query(&[
            ("pesapal_notification_type", "CHANGE"),
            ("pesapal_transaction_tracking_id", ""),
        ]));
        assert_eq!(n.actionable_tracking_id(), None);
    }

    #[test]
    fn missing_reference_echoes_empty_value() {
        let n = IpnNotification::from_query(&query(&[
            ("pesapal_notification_type", "CHANGE"),
            ("pesapal_transaction_tracking_id", "trk-5"),
        ]));
        assert!(n.ack_body().ends_with("&pesapal_merchant_reference="));
    }

    #[test]
    fn reserved_characters_are_re_encoded_in_ack() {
        let n = IpnNotification::from_query(&query(&[
            ("pesapal_notification_type", "CHANGE"),
            ("pesapal_transaction_tracking_id", "trk-6"),
            ("pesapal_merchant_reference", "ORD-6&status=paid"),
        ]));
        let body = n.ack_body();
        assert_eq!(
            body,
            "pesapal_notification_type=CHANGE&pesapal_transaction_tracking_id=trk-6&pesapal_merchant_reference=ORD-6%26status%3Dpaid"
        );

        let decoded: Vec<(String, String)> = form_urlencoded::parse(body.as_bytes()).into_owned().collect();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[2].1, "ORD-6&status=paid");
    }
}
