//! Cryptographic suite resolution and algorithm acceptance.
//!
//! A suite lists the digest and encryption algorithms a policy accepts,
//! minimum key sizes, and per-algorithm expiration dates. Suites layer:
//! any field left unset at a more specific scope (certificate sub-context)
//! is filled from the enclosing scope (context, then policy-wide default).
//! Fields never merge partially; the most specific defined value wins
//! whole.

use crate::model::format_instant;
use crate::policy::Level;
use serde::Serialize;

/// Digest algorithms known to the policy layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl DigestAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha1 => "SHA1",
            DigestAlgorithm::Sha224 => "SHA224",
            DigestAlgorithm::Sha256 => "SHA256",
            DigestAlgorithm::Sha384 => "SHA384",
            DigestAlgorithm::Sha512 => "SHA512",
            DigestAlgorithm::Sha3_256 => "SHA3-256",
            DigestAlgorithm::Sha3_384 => "SHA3-384",
            DigestAlgorithm::Sha3_512 => "SHA3-512",
        }
    }
}

/// Encryption (signature) algorithms known to the policy layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EncryptionAlgorithm {
    Rsa,
    RsaSsaPss,
    Dsa,
    Ecdsa,
    PlainEcdsa,
    Eddsa,
}

impl EncryptionAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionAlgorithm::Rsa => "RSA",
            EncryptionAlgorithm::RsaSsaPss => "RSASSA-PSS",
            EncryptionAlgorithm::Dsa => "DSA",
            EncryptionAlgorithm::Ecdsa => "ECDSA",
            EncryptionAlgorithm::PlainEcdsa => "PLAIN-ECDSA",
            EncryptionAlgorithm::Eddsa => "EdDSA",
        }
    }
}

/// Acceptable-algorithm set with expiration dates and key-size floors.
///
/// Every field is optional so that partially specified suites can inherit
/// the remainder from an enclosing scope via [`CryptographicSuite::merged_over`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CryptographicSuite {
    /// Digest algorithms the policy accepts.
    pub acceptable_digest_algorithms: Option<Vec<DigestAlgorithm>>,
    /// Encryption algorithms the policy accepts.
    pub acceptable_encryption_algorithms: Option<Vec<EncryptionAlgorithm>>,
    /// Minimum key size in bits per encryption algorithm.
    pub min_key_sizes: Option<Vec<(EncryptionAlgorithm, u32)>>,
    /// Expiration instant per digest algorithm, Unix seconds, inclusive.
    pub digest_expiration_dates: Option<Vec<(DigestAlgorithm, i64)>>,
    /// Expiration instant per (encryption algorithm, minimum key size).
    pub encryption_expiration_dates: Option<Vec<(EncryptionAlgorithm, u32, i64)>>,
    /// Instant the suite definition was last updated.
    pub update_date: Option<i64>,
    /// Enforcement level of the cryptographic checks.
    pub level: Option<Level>,
    /// Stricter level applied once validation time passes `update_date`.
    pub post_update_level: Option<Level>,
}

impl CryptographicSuite {
    /// Merge this suite over `base`, field by field.
    ///
    /// Any field unset here is taken whole from `base`; a set field is
    /// kept whole. Fields are never combined element-wise.
    pub fn merged_over(&self, base: &CryptographicSuite) -> CryptographicSuite {
        CryptographicSuite {
            acceptable_digest_algorithms: self
                .acceptable_digest_algorithms
                .clone()
                .or_else(|| base.acceptable_digest_algorithms.clone()),
            acceptable_encryption_algorithms: self
                .acceptable_encryption_algorithms
                .clone()
                .or_else(|| base.acceptable_encryption_algorithms.clone()),
            min_key_sizes: self
                .min_key_sizes
                .clone()
                .or_else(|| base.min_key_sizes.clone()),
            digest_expiration_dates: self
                .digest_expiration_dates
                .clone()
                .or_else(|| base.digest_expiration_dates.clone()),
            encryption_expiration_dates: self
                .encryption_expiration_dates
                .clone()
                .or_else(|| base.encryption_expiration_dates.clone()),
            update_date: self.update_date.or(base.update_date),
            level: self.level.or(base.level),
            post_update_level: self.post_update_level.or(base.post_update_level),
        }
    }

    /// Enforcement level in effect at `validation_time`.
    ///
    /// The stricter post-update level applies only once validation time
    /// exceeds the suite's declared update date. Returns `None` when the
    /// suite carries no level, meaning the cryptographic check is not
    /// enforced.
    pub fn effective_level(&self, validation_time: i64) -> Option<Level> {
        match self.update_date {
            Some(update) if validation_time > update => self.post_update_level.or(self.level),
            _ => self.level,
        }
    }

    /// Expiration instant declared for a digest algorithm, if any.
    pub fn digest_expiration(&self, algorithm: DigestAlgorithm) -> Option<i64> {
        self.digest_expiration_dates
            .as_ref()?
            .iter()
            .find(|(a, _)| *a == algorithm)
            .map(|(_, date)| *date)
    }

    /// Expiration instant applicable to an encryption algorithm at the
    /// given key size.
    ///
    /// Among the declared (algorithm, min key size, date) entries the one
    /// with the greatest min key size not exceeding `key_size` applies.
    pub fn encryption_expiration(
        &self,
        algorithm: EncryptionAlgorithm,
        key_size: u32,
    ) -> Option<i64> {
        self.encryption_expiration_dates
            .as_ref()?
            .iter()
            .filter(|(a, min, _)| *a == algorithm && *min <= key_size)
            .max_by_key(|(_, min, _)| *min)
            .map(|(_, _, date)| *date)
    }

    /// Whether the digest algorithm is acceptable at `validation_time`.
    ///
    /// The expiration boundary is inclusive: an algorithm expiring at
    /// instant D is still acceptable at D.
    pub fn is_digest_acceptable(&self, algorithm: DigestAlgorithm, validation_time: i64) -> bool {
        if let Some(accepted) = &self.acceptable_digest_algorithms {
            if !accepted.contains(&algorithm) {
                return false;
            }
        }
        match self.digest_expiration(algorithm) {
            Some(expiration) => validation_time <= expiration,
            None => true,
        }
    }

    /// Whether the encryption algorithm with the given key size is
    /// acceptable at `validation_time`.
    pub fn is_encryption_acceptable(
        &self,
        algorithm: EncryptionAlgorithm,
        key_size: u32,
        validation_time: i64,
    ) -> bool {
        if let Some(accepted) = &self.acceptable_encryption_algorithms {
            if !accepted.contains(&algorithm) {
                return false;
            }
        }
        if let Some(floors) = &self.min_key_sizes {
            let mut found = false;
            let mut size_ok = false;
            for (a, min) in floors {
                if *a == algorithm {
                    found = true;
                    if *min <= key_size {
                        size_ok = true;
                    }
                }
            }
            if found && !size_ok {
                return false;
            }
        }
        match self.encryption_expiration(algorithm, key_size) {
            Some(expiration) => validation_time <= expiration,
            None => true,
        }
    }

    /// Digest algorithms from the acceptable list still reliable at
    /// `validation_time`.
    pub fn reliable_digest_algorithms_at(&self, validation_time: i64) -> Vec<DigestAlgorithm> {
        self.acceptable_digest_algorithms
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(|a| self.is_digest_acceptable(*a, validation_time))
            .collect()
    }

    /// Encryption algorithms from the acceptable list still reliable at
    /// `validation_time`, paired with their minimum accepted key size.
    pub fn reliable_encryption_algorithms_at(
        &self,
        validation_time: i64,
    ) -> Vec<(EncryptionAlgorithm, u32)> {
        self.acceptable_encryption_algorithms
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .copied()
            .map(|a| {
                let floor = self
                    .min_key_sizes
                    .as_deref()
                    .unwrap_or(&[])
                    .iter()
                    .filter(|(fa, _)| *fa == a)
                    .map(|(_, min)| *min)
                    .min()
                    .unwrap_or(0);
                (a, floor)
            })
            .filter(|(a, floor)| self.is_encryption_acceptable(*a, *floor, validation_time))
            .collect()
    }

    /// Evaluate a certificate's signing algorithms against this suite.
    ///
    /// Returns `None` when acceptable, or a failure detail for the first
    /// violated rule. A certificate whose snapshot carries no algorithm
    /// information has nothing to evaluate and passes.
    pub(crate) fn evaluate_certificate(
        &self,
        certificate: &crate::model::Certificate,
        validation_time: i64,
    ) -> Option<String> {
        if let Some(digest) = certificate.signature_digest_algorithm {
            if !self.is_digest_acceptable(digest, validation_time) {
                return Some(match self.digest_expiration(digest) {
                    Some(expiration) if validation_time > expiration => format!(
                        "digest algorithm {} expired on {}",
                        digest.as_str(),
                        format_instant(expiration)
                    ),
                    _ => format!("digest algorithm {} is not acceptable", digest.as_str()),
                });
            }
        }
        if let Some(encryption) = certificate.signature_encryption_algorithm {
            let key_size = certificate.signature_key_size.unwrap_or(0);
            if !self.is_encryption_acceptable(encryption, key_size, validation_time) {
                return Some(match self.encryption_expiration(encryption, key_size) {
                    Some(expiration) if validation_time > expiration => format!(
                        "encryption algorithm {} with key size {} expired on {}",
                        encryption.as_str(),
                        key_size,
                        format_instant(expiration)
                    ),
                    _ => format!(
                        "encryption algorithm {} with key size {} is not acceptable",
                        encryption.as_str(),
                        key_size
                    ),
                });
            }
        }
        None
    }
}
