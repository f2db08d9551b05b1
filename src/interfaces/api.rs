//! Request-layer adapter.
//!
//! Maps credentialed JSON requests onto `AccountService` and folds every outcome into
//! a `{status, msg}` response using the service's historical status codes.

use crate::application::service::{
    AccountService, BalanceRequest, DepositRequest, LoanRequest, TransferRequest, WithdrawRequest,
};
use crate::domain::account::{AccountId, Balance};
use crate::domain::ports::AuthenticatorRef;
use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

pub const STATUS_OK: u16 = 200;
pub const STATUS_UNKNOWN_ACCOUNT: u16 = 301;
pub const STATUS_BAD_CREDENTIAL: u16 = 302;
pub const STATUS_INSUFFICIENT_FUNDS: u16 = 303;
pub const STATUS_INVALID_AMOUNT: u16 = 304;
pub const STATUS_INTERNAL: u16 = 500;
pub const STATUS_UNAVAILABLE: u16 = 503;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Add,
    Withdraw,
    Transfer,
    Balance,
    TakeLoan,
    PayLoan,
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        match path.trim_start_matches('/') {
            "add" => Ok(Endpoint::Add),
            "withdraw" => Ok(Endpoint::Withdraw),
            "transfer" => Ok(Endpoint::Transfer),
            "balance" => Ok(Endpoint::Balance),
            "take_loan" => Ok(Endpoint::TakeLoan),
            "pay_loan" => Ok(Endpoint::PayLoan),
            other => Err(format!("unknown endpoint `{other}`")),
        }
    }
}

/// Body shared by every endpoint. `to` is only read by transfers.
#[derive(Debug, Deserialize)]
pub struct ApiRequest {
    pub username: AccountId,
    pub password: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub to: Option<AccountId>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Balance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt: Option<Balance>,
}

impl ApiResponse {
    pub fn ok(msg: impl Into<String>, balance: Balance) -> Self {
        Self {
            status: STATUS_OK,
            msg: msg.into(),
            balance: Some(balance),
            debt: None,
        }
    }

    pub fn error(status: u16, msg: impl Into<String>) -> Self {
        Self {
            status,
            msg: msg.into(),
            balance: None,
            debt: None,
        }
    }
}

impl From<&LedgerError> for ApiResponse {
    fn from(err: &LedgerError) -> Self {
        Self::error(status_code(err), err.to_string())
    }
}

pub fn status_code(err: &LedgerError) -> u16 {
    match err {
        LedgerError::UnknownAccount(_)
        | LedgerError::UnknownRecipient(_)
        | LedgerError::MissingRecipient(_)
        | LedgerError::AccountExists(_) => STATUS_UNKNOWN_ACCOUNT,
        LedgerError::InsufficientFunds { .. } | LedgerError::CreditLimitExceeded { .. } => {
            STATUS_INSUFFICIENT_FUNDS
        }
        LedgerError::InvalidAmount(_) => STATUS_INVALID_AMOUNT,
        LedgerError::StoreUnavailable(_) => STATUS_UNAVAILABLE,
        LedgerError::Config(_) | LedgerError::Csv(_) | LedgerError::Io(_) => STATUS_INTERNAL,
    }
}

pub struct RequestHandler {
    service: AccountService,
    authenticator: AuthenticatorRef,
}

impl RequestHandler {
    pub fn new(service: AccountService, authenticator: AuthenticatorRef) -> Self {
        Self {
            service,
            authenticator,
        }
    }

    pub async fn handle(&self, endpoint: Endpoint, body: &str) -> ApiResponse {
        let request: ApiRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(e) => {
                return ApiResponse::error(STATUS_INVALID_AMOUNT, format!("Malformed request: {e}"));
            }
        };

        let view = match self
            .service
            .balance(BalanceRequest {
                account: request.username.clone(),
            })
            .await
        {
            Ok(view) => view,
            Err(e) => return ApiResponse::from(&e),
        };
        if !self
            .authenticator
            .verify(&request.username, &request.password)
            .await
        {
            warn!(account = %request.username, "Rejected credential");
            return ApiResponse::error(STATUS_BAD_CREDENTIAL, "Incorrect Password");
        }

        let account = request.username;
        let outcome = match (endpoint, request.amount) {
            (Endpoint::Balance, _) => Ok(ApiResponse {
                debt: Some(view.debt),
                ..ApiResponse::ok("Account balance.", view.balance)
            }),
            (_, None) => Err(LedgerError::InvalidAmount("missing amount".to_string())),
            (Endpoint::Add, Some(amount)) => self
                .service
                .deposit(DepositRequest { account, amount })
                .await
                .map(|b| ApiResponse::ok("Amount successfully added.", b)),
            (Endpoint::Withdraw, Some(amount)) => self
                .service
                .withdraw(WithdrawRequest { account, amount })
                .await
                .map(|b| ApiResponse::ok("Amount successfully withdrawn.", b)),
            (Endpoint::Transfer, Some(amount)) => {
                let Some(to) = request.to else {
                    return ApiResponse::error(
                        STATUS_UNKNOWN_ACCOUNT,
                        "Receiver username is invalid.",
                    );
                };
                self.service
                    .transfer(TransferRequest {
                        from: account,
                        to,
                        amount,
                    })
                    .await
                    .map(|b| ApiResponse::ok("Amount transferred successfully.", b))
            }
            (Endpoint::TakeLoan, Some(amount)) => self
                .service
                .take_loan(LoanRequest { account, amount })
                .await
                .map(|b| ApiResponse::ok("Loan added to your account.", b)),
            (Endpoint::PayLoan, Some(amount)) => self
                .service
                .repay_loan(LoanRequest { account, amount })
                .await
                .map(|b| ApiResponse::ok("You have successfully paid your loan.", b)),
        };

        outcome.unwrap_or_else(|e| ApiResponse::from(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_parsing() {
        assert_eq!("/add".parse::<Endpoint>(), Ok(Endpoint::Add));
        assert_eq!("pay_loan".parse::<Endpoint>(), Ok(Endpoint::PayLoan));
        assert!("/register".parse::<Endpoint>().is_err());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status_code(&LedgerError::UnknownRecipient("bob".into())), 301);
        assert_eq!(status_code(&LedgerError::MissingRecipient("alice".into())), 301);
        assert_eq!(
            status_code(&LedgerError::InsufficientFunds {
                account: "alice".into(),
                balance: Decimal::ZERO,
                requested: Decimal::ONE,
            }),
            303
        );
        assert_eq!(status_code(&LedgerError::InvalidAmount("0".into())), 304);
        assert_eq!(status_code(&LedgerError::StoreUnavailable("busy".into())), 503);
    }

    #[test]
    fn test_response_shape() {
        let json = serde_json::to_value(ApiResponse::error(304, "Invalid amount")).unwrap();
        assert_eq!(json, serde_json::json!({ "status": 304, "msg": "Invalid amount" }));
    }
}
