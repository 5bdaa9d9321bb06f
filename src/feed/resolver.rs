//! DNS resolution that refuses to hand out private addresses.
//!
//! URL checks only see host names. A public name can still resolve to
//! `127.0.0.1` or `10.x`, so the finder's client resolves through here and
//! drops every address the SSRF policy would reject.

use crate::util::is_private_ip;
use hickory_resolver::TokioResolver;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

/// A hickory-backed resolver that only returns public addresses.
///
/// The hickory resolver is built on first use, inside the runtime.
#[derive(Clone, Default)]
pub(super) struct PublicOnlyResolver {
    inner: Arc<OnceCell<TokioResolver>>,
}

impl Resolve for PublicOnlyResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let resolver = inner
                .get_or_try_init(|| async { TokioResolver::builder_tokio()?.build() })
                .await?;
            let lookup = resolver.lookup_ip(name.as_str()).await?;
            let addrs = public_addrs(name.as_str(), lookup.iter())?;
            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}

#[derive(Debug, Error)]
#[error("{host} resolves only to private addresses")]
pub(super) struct PrivateResolution {
    host: String,
}

/// Keeps the public addresses. The port is left at 0 for reqwest to fill in.
pub(super) fn public_addrs(
    host: &str,
    ips: impl IntoIterator<Item = IpAddr>,
) -> Result<Vec<SocketAddr>, PrivateResolution> {
    let addrs: Vec<SocketAddr> = ips
        .into_iter()
        .filter(|ip| {
            let private = is_private_ip(ip);
            if private {
                tracing::debug!(host = %host, ip = %ip, "Dropping private address");
            }
            !private
        })
        .map(|ip| SocketAddr::new(ip, 0))
        .collect();

    if addrs.is_empty() {
        return Err(PrivateResolution {
            host: host.to_owned(),
        });
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ips(list: &[&str]) -> Vec<IpAddr> {
        list.iter().map(|ip| ip.parse().unwrap()).collect()
    }

    #[test]
    fn test_private_addresses_dropped() {
        let addrs = public_addrs(
            "mixed.example.com",
            ips(&["10.0.0.5", "93.184.216.34", "::ffff:127.0.0.1", "2606:2800:220:1::1"]),
        )
        .unwrap();

        assert_eq!(
            addrs,
            vec![
                "93.184.216.34:0".parse::<SocketAddr>().unwrap(),
                "[2606:2800:220:1::1]:0".parse::<SocketAddr>().unwrap(),
            ]
        );
    }

    #[test]
    fn test_name_pointing_inside_is_refused() {
        let err = public_addrs("intranet.example.com", ips(&["127.0.0.1", "192.168.1.20", "fd00::1"]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "intranet.example.com resolves only to private addresses"
        );
    }

    #[test]
    fn test_no_addresses_is_refused() {
        assert!(public_addrs("empty.example.com", Vec::new()).is_err());
    }
}
