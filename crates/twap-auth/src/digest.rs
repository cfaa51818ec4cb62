//! Authorization digests.
//!
//! Two structured hashes identify a conditional order for signing purposes:
//! 1. Creation digest: EIP-712 hash of `ConditionalOrder(bytes payload)`
//! 2. Cancellation digest: EIP-712 hash of `CancelOrder(bytes32 order)` over
//!    the creation digest
//!
//! Both use the settlement domain separator and the standard
//! `keccak256(0x19 0x01 || domainSeparator || structHash)` layout.
//!
//! The wallet never stores these digests directly. It records its own
//! message hash of them, `SafeMessage(bytes message)` in the wallet's domain;
//! see [`wallet_message_hash`].

use alloy::primitives::{keccak256, Address, Bytes, B256};
use alloy::sol;
use alloy::sol_types::{eip712_domain, Eip712Domain, SolStruct};

sol! {
    #[derive(Debug)]
    struct ConditionalOrder {
        bytes payload;
    }

    #[derive(Debug)]
    struct CancelOrder {
        bytes32 order;
    }

    #[derive(Debug)]
    struct SafeMessage {
        bytes message;
    }
}

/// `keccak256(0x19 0x01 || domain_separator || struct_hash)`.
pub fn eip712_signing_hash(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut data = [0u8; 66];
    data[0] = 0x19;
    data[1] = 0x01;
    data[2..34].copy_from_slice(domain_separator.as_slice());
    data[34..].copy_from_slice(struct_hash.as_slice());
    keccak256(data)
}

/// Digest the wallet signs to authorize a conditional order.
pub fn creation_digest(payload: &[u8], domain_separator: B256) -> B256 {
    let order = ConditionalOrder {
        payload: Bytes::copy_from_slice(payload),
    };
    eip712_signing_hash(domain_separator, order.eip712_hash_struct())
}

/// Digest the wallet signs to cancel the order identified by `creation_digest`.
pub fn cancellation_digest(creation_digest: B256, domain_separator: B256) -> B256 {
    let cancel = CancelOrder {
        order: creation_digest,
    };
    eip712_signing_hash(domain_separator, cancel.eip712_hash_struct())
}

/// The wallet's signed-message domain: `EIP712Domain(uint256 chainId,address verifyingContract)`.
pub fn wallet_domain(chain_id: u64, wallet: Address) -> Eip712Domain {
    eip712_domain! {
        chain_id: chain_id,
        verifying_contract: wallet,
    }
}

/// Hash under which the wallet records "I have signed `digest`".
///
/// The message is the 32-byte digest itself.
pub fn wallet_message_hash(wallet_domain: &Eip712Domain, digest: B256) -> B256 {
    let message = SafeMessage {
        message: Bytes::copy_from_slice(digest.as_slice()),
    };
    message.eip712_signing_hash(wallet_domain)
}
