//! Hash algorithm negotiation for artefact verification.
//!
//! The index advertises a mapping of algorithm names to hex digests for each
//! file. [`negotiate`] walks that mapping in the order the index sent it and
//! picks the first algorithm this build can compute. The first supported
//! entry wins, not the strongest one.

use digest::DynDigest;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;

/// A hash algorithm that can be computed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// MD5.
    Md5,
    /// SHA-1.
    Sha1,
    /// SHA-224.
    Sha224,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
    /// SHA-512/224.
    Sha512_224,
    /// SHA-512/256.
    Sha512_256,
    /// SHA3-224.
    Sha3_224,
    /// SHA3-256.
    Sha3_256,
    /// SHA3-384.
    Sha3_384,
    /// SHA3-512.
    Sha3_512,
    /// BLAKE2b with a 512-bit digest.
    Blake2b,
    /// BLAKE2s with a 256-bit digest.
    Blake2s,
}

/// Every locally supported algorithm.
pub const SUPPORTED_ALGORITHMS: [HashAlgorithm; 14] = [
    HashAlgorithm::Md5,
    HashAlgorithm::Sha1,
    HashAlgorithm::Sha224,
    HashAlgorithm::Sha256,
    HashAlgorithm::Sha384,
    HashAlgorithm::Sha512,
    HashAlgorithm::Sha512_224,
    HashAlgorithm::Sha512_256,
    HashAlgorithm::Sha3_224,
    HashAlgorithm::Sha3_256,
    HashAlgorithm::Sha3_384,
    HashAlgorithm::Sha3_512,
    HashAlgorithm::Blake2b,
    HashAlgorithm::Blake2s,
];

impl HashAlgorithm {
    /// Look up an algorithm by its index name, ignoring ASCII case.
    ///
    /// # Examples
    ///
    /// ```
    /// use pypi_multidl::artefact::hash::HashAlgorithm;
    ///
    /// assert_eq!(HashAlgorithm::from_name("SHA256"), Some(HashAlgorithm::Sha256));
    /// assert_eq!(HashAlgorithm::from_name("whirlpool"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        SUPPORTED_ALGORITHMS
            .into_iter()
            .find(|algorithm| algorithm.name().eq_ignore_ascii_case(name))
    }

    /// Return the canonical lowercase name, as used in index responses.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha512_224 => "sha512_224",
            Self::Sha512_256 => "sha512_256",
            Self::Sha3_224 => "sha3_224",
            Self::Sha3_256 => "sha3_256",
            Self::Sha3_384 => "sha3_384",
            Self::Sha3_512 => "sha3_512",
            Self::Blake2b => "blake2b",
            Self::Blake2s => "blake2s",
        }
    }

    /// Create a fresh incremental hash context for this algorithm.
    #[must_use]
    pub fn hasher(self) -> Box<dyn DynDigest> {
        match self {
            Self::Md5 => Box::new(md5::Md5::default()),
            Self::Sha1 => Box::new(sha1::Sha1::default()),
            Self::Sha224 => Box::new(sha2::Sha224::default()),
            Self::Sha256 => Box::new(sha2::Sha256::default()),
            Self::Sha384 => Box::new(sha2::Sha384::default()),
            Self::Sha512 => Box::new(sha2::Sha512::default()),
            Self::Sha512_224 => Box::new(sha2::Sha512_224::default()),
            Self::Sha512_256 => Box::new(sha2::Sha512_256::default()),
            Self::Sha3_224 => Box::new(sha3::Sha3_224::default()),
            Self::Sha3_256 => Box::new(sha3::Sha3_256::default()),
            Self::Sha3_384 => Box::new(sha3::Sha3_384::default()),
            Self::Sha3_512 => Box::new(sha3::Sha3_512::default()),
            Self::Blake2b => Box::new(blake2::Blake2b512::default()),
            Self::Blake2s => Box::new(blake2::Blake2s256::default()),
        }
    }

    /// Compute the lowercase hex digest of `data` in one shot.
    #[must_use]
    pub fn hex_digest(self, data: &[u8]) -> String {
        let mut hasher = self.hasher();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The digest an artefact is expected to hash to.
///
/// Algorithm and digest travel together so that verification is
/// all-or-nothing per artefact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedHash {
    algorithm: HashAlgorithm,
    digest: String,
}

impl ExpectedHash {
    /// Pair an algorithm with a hex digest, lower-casing the digest.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, digest: &str) -> Self {
        Self {
            algorithm,
            digest: digest.to_ascii_lowercase(),
        }
    }

    /// Return the negotiated algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Return the expected digest as lowercase hex.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Return true when `actual` equals the expected digest, ignoring case.
    #[must_use]
    pub fn matches(&self, actual: &str) -> bool {
        self.digest.eq_ignore_ascii_case(actual)
    }
}

/// Algorithm-to-digest pairs in the order the index listed them.
///
/// Deserialises from a JSON object without sorting its keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashDigests(Vec<(String, String)>);

impl HashDigests {
    /// Iterate over `(algorithm, digest)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(algorithm, digest)| (algorithm.as_str(), digest.as_str()))
    }

    /// Return true when the index advertised no digests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<A, D> FromIterator<(A, D)> for HashDigests
where
    A: Into<String>,
    D: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (A, D)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(algorithm, digest)| (algorithm.into(), digest.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for HashDigests {
    fn deserialize<De>(deserializer: De) -> Result<Self, De::Error>
    where
        De: Deserializer<'de>,
    {
        deserializer.deserialize_map(HashDigestsVisitor)
    }
}

struct HashDigestsVisitor;

impl<'de> Visitor<'de> for HashDigestsVisitor {
    type Value = HashDigests;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of hash algorithm names to hex digests")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(pair) = map.next_entry::<String, String>()? {
            pairs.push(pair);
        }
        Ok(HashDigests(pairs))
    }
}

/// Pick the first advertised digest whose algorithm is supported locally.
///
/// Returns `None` when the mapping is empty or lists only unsupported
/// algorithms; the artefact is then fetched without verification.
///
/// # Examples
///
/// ```
/// use pypi_multidl::artefact::hash::{HashAlgorithm, HashDigests, negotiate};
///
/// let hashes: HashDigests = [("whirlpool", "00"), ("SHA256", "ABC"), ("md5", "def")]
///     .into_iter()
///     .collect();
/// let expected = negotiate(&hashes).expect("sha256 is supported");
/// assert_eq!(expected.algorithm(), HashAlgorithm::Sha256);
/// assert_eq!(expected.digest(), "abc");
/// ```
#[must_use]
pub fn negotiate(hashes: &HashDigests) -> Option<ExpectedHash> {
    hashes.iter().find_map(|(name, digest)| {
        HashAlgorithm::from_name(name).map(|algorithm| ExpectedHash::new(algorithm, digest))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn digests(pairs: &[(&str, &str)]) -> HashDigests {
        pairs.iter().copied().collect()
    }

    #[test]
    fn first_supported_entry_wins_over_stronger_ones() {
        let hashes = digests(&[("sha256", "abc"), ("md5", "def")]);
        let expected = negotiate(&hashes).expect("negotiated");
        assert_eq!(expected.algorithm(), HashAlgorithm::Sha256);
        assert_eq!(expected.digest(), "abc");

        let reversed = digests(&[("md5", "def"), ("sha256", "abc")]);
        let expected = negotiate(&reversed).expect("negotiated");
        assert_eq!(expected.algorithm(), HashAlgorithm::Md5);
        assert_eq!(expected.digest(), "def");
    }

    #[test]
    fn unsupported_algorithms_are_skipped() {
        let hashes = digests(&[("crc32", "aa"), ("whirlpool", "bb"), ("sha512", "CC")]);
        let expected = negotiate(&hashes).expect("negotiated");
        assert_eq!(expected.algorithm(), HashAlgorithm::Sha512);
        assert_eq!(expected.digest(), "cc");
    }

    #[rstest]
    #[case::empty(&[])]
    #[case::only_unsupported(&[("whirlpool", "aa"), ("crc32", "bb")])]
    fn no_supported_algorithm_means_no_verification(#[case] pairs: &[(&str, &str)]) {
        assert_eq!(negotiate(&digests(pairs)), None);
    }

    #[rstest]
    #[case::blake2b(r#"{"blake2b":"AB"}"#, HashAlgorithm::Blake2b)]
    #[case::blake2s(r#"{"whirlpool":"00","blake2s":"AB"}"#, HashAlgorithm::Blake2s)]
    fn blake2_only_listings_are_verified(#[case] json: &str, #[case] algorithm: HashAlgorithm) {
        let hashes: HashDigests = serde_json::from_str(json).expect("valid JSON");
        let expected = negotiate(&hashes).expect("negotiated");
        assert_eq!(expected.algorithm(), algorithm);
        assert_eq!(expected.digest(), "ab");
    }

    #[test]
    fn deserialisation_preserves_index_order() {
        let hashes: HashDigests =
            serde_json::from_str(r#"{"sha512":"a","md5":"b","sha256":"c"}"#).expect("valid JSON");
        let names: Vec<&str> = hashes.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["sha512", "md5", "sha256"]);
    }

    #[test]
    fn deserialisation_rejects_non_string_digests() {
        let result = serde_json::from_str::<HashDigests>(r#"{"sha256":42}"#);
        assert!(result.is_err());
    }

    #[rstest]
    #[case::md5(HashAlgorithm::Md5, "5d41402abc4b2a76b9719d911017c592")]
    #[case::sha1(HashAlgorithm::Sha1, "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d")]
    #[case::sha256(
        HashAlgorithm::Sha256,
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    )]
    #[case::blake2b(
        HashAlgorithm::Blake2b,
        "e4cfa39a3d37be31c59609e807970799caa68a19bfaa15135f165085e01d41a6\
         5ba1e1b146aeb6bd0092b49eac214c103ccfa3a365954bbbe52f74a2b3620c94"
    )]
    #[case::blake2s(
        HashAlgorithm::Blake2s,
        "19213bacc58dee6dbde3ceb9a47cbb330b3d86f8cca8997eb00be456f140ca25"
    )]
    fn hex_digest_matches_known_vectors(#[case] algorithm: HashAlgorithm, #[case] expected: &str) {
        assert_eq!(algorithm.hex_digest(b"hello"), expected);
    }

    #[test]
    fn every_supported_name_round_trips() {
        for algorithm in SUPPORTED_ALGORITHMS {
            assert_eq!(HashAlgorithm::from_name(algorithm.name()), Some(algorithm));
            assert_eq!(algorithm.to_string(), algorithm.name());
        }
    }

    #[test]
    fn expected_hash_compares_case_insensitively() {
        let expected = ExpectedHash::new(HashAlgorithm::Sha256, "ABCDEF");
        assert_eq!(expected.digest(), "abcdef");
        assert!(expected.matches("abcdef"));
        assert!(expected.matches("ABCDEF"));
        assert!(!expected.matches("abcde0"));
    }
}
