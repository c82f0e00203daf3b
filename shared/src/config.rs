//! Service configuration for Hooktap.
//!
//! Each service maps to one listener configuration: which port to bind,
//! which webhook path to announce, and the pre-send gating flags. The
//! configuration is built once at startup and never mutated afterwards.

use crate::error::{Error, Result};

/// The webhook services that can be booted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Plain echo endpoint for inspecting arbitrary callbacks
    Generic,
    /// Pre-send callback: gates whether a message may be delivered
    PreSend,
    /// Post-send callback: delivery notifications, logging only
    PostSend,
}

impl Service {
    /// Parse a service name as given on the command line.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "generic" => Ok(Service::Generic),
            "pre-send" | "presend" | "pre_send" => Ok(Service::PreSend),
            "post-send" | "postsend" | "post_send" => Ok(Service::PostSend),
            other => Err(Error::UnknownService(other.to_string())),
        }
    }

    /// Canonical name, usable as the server binary's argument.
    pub fn name(self) -> &'static str {
        match self {
            Service::Generic => "generic",
            Service::PreSend => "pre-send",
            Service::PostSend => "post-send",
        }
    }

    /// Build the immutable listener configuration for this service.
    pub fn config(self) -> ServiceConfig {
        match self {
            Service::Generic => ServiceConfig {
                service: self,
                allow_message_send: true,
                insert_test_ext: false,
                port: 3000,
                webhook_path: "/webhook",
            },
            Service::PreSend => ServiceConfig {
                service: self,
                allow_message_send: true,
                insert_test_ext: true,
                port: 3000,
                webhook_path: "/webhook/pre-send",
            },
            // Different port so it can run next to the pre-send service
            Service::PostSend => ServiceConfig {
                service: self,
                allow_message_send: true,
                insert_test_ext: false,
                port: 3001,
                webhook_path: "/webhook/post-send",
            },
        }
    }
}

/// Process-wide listener configuration, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub service: Service,

    /// Global kill switch: when false the pre-send decision denies
    /// every message without consulting its content.
    pub allow_message_send: bool,

    /// When true, a truthy `payload.ext` on a valid message gets the
    /// `test` sentinel injected into the decision payload.
    pub insert_test_ext: bool,

    /// Port the listener binds on localhost.
    pub port: u16,

    /// Webhook path announced by the launcher once a tunnel URL is known.
    pub webhook_path: &'static str,
}

impl ServiceConfig {
    /// Body returned by the liveness route.
    pub fn liveness_message(&self) -> String {
        match self.service {
            Service::Generic => "ok".to_string(),
            _ => format!("{} webhook service is running", self.service.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_names() {
        assert_eq!(Service::from_name("generic").unwrap(), Service::Generic);
        assert_eq!(Service::from_name("pre-send").unwrap(), Service::PreSend);
        assert_eq!(Service::from_name("Pre_Send").unwrap(), Service::PreSend);
        assert_eq!(Service::from_name("post-send").unwrap(), Service::PostSend);
        assert!(Service::from_name("bogus").is_err());
    }

    #[test]
    fn test_ports_and_paths() {
        assert_eq!(Service::Generic.config().port, 3000);
        assert_eq!(Service::Generic.config().webhook_path, "/webhook");
        assert_eq!(Service::PreSend.config().port, 3000);
        assert_eq!(Service::PreSend.config().webhook_path, "/webhook/pre-send");
        assert_eq!(Service::PostSend.config().port, 3001);
        assert_eq!(Service::PostSend.config().webhook_path, "/webhook/post-send");
    }

    #[test]
    fn test_liveness_messages() {
        assert_eq!(Service::Generic.config().liveness_message(), "ok");
        assert_eq!(
            Service::PreSend.config().liveness_message(),
            "pre-send webhook service is running"
        );
    }
}
