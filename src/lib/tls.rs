//! Typed detection of TLS certificate verification failures.
use std::{error::Error as StdError, io};

/// Walk an error's source chain and report whether any link is a rustls
/// certificate rejection.
///
/// hyper hands rustls failures back wrapped in `io::Error`, whose `source()`
/// skips the wrapped value, so those are unwrapped explicitly.
pub fn is_certificate_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(link) = current {
        if let Some(tls) = link.downcast_ref::<rustls::Error>() {
            if is_certificate_variant(tls) {
                return true;
            }
        }
        if let Some(inner) = link
            .downcast_ref::<io::Error>()
            .and_then(|io_err| io_err.get_ref())
        {
            if is_certificate_error(inner) {
                return true;
            }
        }
        current = link.source();
    }
    false
}

fn is_certificate_variant(err: &rustls::Error) -> bool {
    matches!(
        err,
        rustls::Error::InvalidCertificate(_) | rustls::Error::NoCertificatesPresented
    )
}
