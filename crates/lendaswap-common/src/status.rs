//! Swap lifecycle
//!
//! A swap has two legs that settle independently: the leg the client funds and the leg the
//! server funds. The backend reports the combined position as a single lowercase status string.
//! [`SwapStatus`] is the closed set of those strings. Composite states, where the two legs ended
//! asymmetrically, are regular outcomes and not errors.
//!
//! Normal flow:
//!   `pending` → `clientfunded` → `serverfunded` → `clientredeeming` → `clientredeemed` → `serverredeemed`
//!
//! Refund flows:
//!   `pending` → `expired`
//!   `clientfunded` → `clientrefunded`
//!   `serverfunded` → `clientfundedserverrefunded`
//!   `clientinvalidfunded` | `clientfundedtoolate` → `clientrefunded`
//!
//! Parsing an unknown string fails with [`Error::UnknownSwapStatus`]. There is no catch-all
//! variant, so nothing outside the vocabulary can reach the claim or refund predicates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Swap status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapStatus {
    /// Swap created, waiting for the client to fund.
    Pending,
    /// Client leg funded, waiting for the server to lock its side.
    ClientFunded,
    /// Server leg locked with the client's hash lock. The client can claim by revealing the
    /// preimage.
    ServerFunded,
    /// Claim transaction sent. The preimage is public but the claim may not be confirmed yet.
    ClientRedeeming,
    /// Client claimed the server leg.
    ClientRedeemed,
    /// Server claimed the client leg with the revealed preimage. Swap complete.
    ServerRedeemed,
    /// Client refunded before the server funded.
    ClientRefunded,
    /// Swap expired before the client funded.
    Expired,
    /// Client leg still funded, server leg timed out and was refunded.
    ClientFundedServerRefunded,
    /// Client refunded while the server leg is still locked.
    ///
    /// Should never happen with correct timelocks. The server must refund its leg.
    ClientRefundedServerFunded,
    /// Both legs refunded.
    ClientRefundedServerRefunded,
    /// Client funded with wrong parameters (amount, address). Only the client leg exists.
    ClientInvalidFunded,
    /// Client funded after the lightning invoice expired.
    ClientFundedTooLate,
    /// Client both claimed and refunded.
    ClientRedeemedAndClientRefunded,
}

impl SwapStatus {
    /// Every recognised status
    pub const ALL: [SwapStatus; 14] = [
        SwapStatus::Pending,
        SwapStatus::ClientFunded,
        SwapStatus::ServerFunded,
        SwapStatus::ClientRedeeming,
        SwapStatus::ClientRedeemed,
        SwapStatus::ServerRedeemed,
        SwapStatus::ClientRefunded,
        SwapStatus::Expired,
        SwapStatus::ClientFundedServerRefunded,
        SwapStatus::ClientRefundedServerFunded,
        SwapStatus::ClientRefundedServerRefunded,
        SwapStatus::ClientInvalidFunded,
        SwapStatus::ClientFundedTooLate,
        SwapStatus::ClientRedeemedAndClientRefunded,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapStatus::Pending => "pending",
            SwapStatus::ClientFunded => "clientfunded",
            SwapStatus::ServerFunded => "serverfunded",
            SwapStatus::ClientRedeeming => "clientredeeming",
            SwapStatus::ClientRedeemed => "clientredeemed",
            SwapStatus::ServerRedeemed => "serverredeemed",
            SwapStatus::ClientRefunded => "clientrefunded",
            SwapStatus::Expired => "expired",
            SwapStatus::ClientFundedServerRefunded => "clientfundedserverrefunded",
            SwapStatus::ClientRefundedServerFunded => "clientrefundedserverfunded",
            SwapStatus::ClientRefundedServerRefunded => "clientrefundedserverrefunded",
            SwapStatus::ClientInvalidFunded => "clientinvalidfunded",
            SwapStatus::ClientFundedTooLate => "clientfundedtoolate",
            SwapStatus::ClientRedeemedAndClientRefunded => "clientredeemedandclientrefunded",
        }
    }

    /// Whether the client may claim the server leg by revealing the preimage
    pub fn can_claim(&self) -> bool {
        matches!(self, SwapStatus::ServerFunded)
    }

    /// Whether the client may refund its own leg at unix time `now`
    ///
    /// Requires the client leg to still be funded and `now` to have reached the absolute
    /// `refund_locktime`.
    pub fn can_refund(&self, now: u64, refund_locktime: u32) -> bool {
        let client_leg_funded = matches!(
            self,
            SwapStatus::ClientFunded
                | SwapStatus::ClientFundedServerRefunded
                | SwapStatus::ClientFundedTooLate
        );

        client_leg_funded && now >= u64::from(refund_locktime)
    }

    /// Partial-failure and anomaly states
    pub fn is_anomalous(&self) -> bool {
        matches!(
            self,
            SwapStatus::ClientFundedServerRefunded
                | SwapStatus::ClientRefundedServerFunded
                | SwapStatus::ClientRefundedServerRefunded
                | SwapStatus::ClientInvalidFunded
                | SwapStatus::ClientFundedTooLate
                | SwapStatus::ClientRedeemedAndClientRefunded
        )
    }

    /// No further transitions expected
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SwapStatus::ServerRedeemed
                | SwapStatus::ClientRefunded
                | SwapStatus::Expired
                | SwapStatus::ClientRefundedServerRefunded
                | SwapStatus::ClientRedeemedAndClientRefunded
        )
    }
}

impl FromStr for SwapStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SwapStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::UnknownSwapStatus(s.to_string()))
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for SwapStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SwapStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SwapStatus::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPOSITE_AND_ANOMALY: [SwapStatus; 6] = [
        SwapStatus::ClientFundedServerRefunded,
        SwapStatus::ClientRefundedServerFunded,
        SwapStatus::ClientRefundedServerRefunded,
        SwapStatus::ClientInvalidFunded,
        SwapStatus::ClientFundedTooLate,
        SwapStatus::ClientRedeemedAndClientRefunded,
    ];

    #[test]
    fn test_wire_vocabulary() {
        let wire = [
            "pending",
            "clientfunded",
            "serverfunded",
            "clientredeeming",
            "clientredeemed",
            "serverredeemed",
            "clientrefunded",
            "expired",
            "clientfundedserverrefunded",
            "clientrefundedserverfunded",
            "clientrefundedserverrefunded",
            "clientinvalidfunded",
            "clientfundedtoolate",
            "clientredeemedandclientrefunded",
        ];

        for s in wire {
            let status = SwapStatus::from_str(s).unwrap();
            assert_eq!(status.as_str(), s);
            assert_eq!(
                serde_json::to_string(&status).unwrap(),
                format!("\"{}\"", s)
            );
        }
    }

    #[test]
    fn test_unknown_status_fails_closed() {
        for s in ["ServerFunded", "server_funded", "refunded", ""] {
            assert!(matches!(
                SwapStatus::from_str(s),
                Err(Error::UnknownSwapStatus(_))
            ));
        }

        let err = serde_json::from_str::<SwapStatus>("\"serverfundedtwice\"").unwrap_err();
        assert!(err.to_string().contains("serverfundedtwice"));
    }

    #[test]
    fn test_can_claim_only_server_funded() {
        assert!(SwapStatus::ServerFunded.can_claim());
        assert!(!SwapStatus::Pending.can_claim());

        let claimable: Vec<_> = SwapStatus::ALL
            .into_iter()
            .filter(|s| s.can_claim())
            .collect();
        assert_eq!(claimable, vec![SwapStatus::ServerFunded]);
    }

    #[test]
    fn test_can_refund_respects_locktime() {
        let t = 1_700_000_000u64;
        let locktime = t as u32;

        assert!(SwapStatus::ClientFunded.can_refund(t, locktime - 1));
        assert!(SwapStatus::ClientFunded.can_refund(t, locktime));
        assert!(!SwapStatus::ClientFunded.can_refund(t, locktime + 1));

        assert!(SwapStatus::ClientFundedServerRefunded.can_refund(t, locktime));
        assert!(SwapStatus::ClientFundedTooLate.can_refund(t, locktime));

        for status in [
            SwapStatus::Pending,
            SwapStatus::ServerFunded,
            SwapStatus::ClientRefunded,
            SwapStatus::Expired,
            SwapStatus::ServerRedeemed,
        ] {
            assert!(!status.can_refund(u64::MAX, 0), "{status}");
        }
    }

    #[test]
    fn test_composite_states_never_claimable() {
        for status in COMPOSITE_AND_ANOMALY {
            assert!(status.is_anomalous());
            assert!(!status.can_claim(), "{status}");
        }

        for status in [
            SwapStatus::ClientRefundedServerFunded,
            SwapStatus::ClientRefundedServerRefunded,
            SwapStatus::ClientInvalidFunded,
            SwapStatus::ClientRedeemedAndClientRefunded,
        ] {
            assert!(!status.can_refund(u64::MAX, 0), "{status}");
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(SwapStatus::ServerRedeemed.is_terminal());
        assert!(SwapStatus::Expired.is_terminal());
        assert!(!SwapStatus::ServerFunded.is_terminal());
        assert!(!SwapStatus::ClientRefundedServerFunded.is_terminal());
    }
}
