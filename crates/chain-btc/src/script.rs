use crate::address;
use crate::error::BtcError;
use crate::network::BtcNetwork;

pub const OP_DUP: u8 = 0x76;
pub const OP_HASH160: u8 = 0xA9;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_CHECKSIG: u8 = 0xAC;
pub const OP_PUSHDATA1: u8 = 0x4C;
pub const OP_PUSHDATA2: u8 = 0x4D;
pub const OP_PUSHDATA4: u8 = 0x4E;

/// Length of a canonical P2PKH scriptPubKey.
pub const P2PKH_SCRIPT_LEN: usize = 25;

/// Build a P2PKH scriptPubKey: OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY OP_CHECKSIG
pub fn p2pkh_script(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(P2PKH_SCRIPT_LEN);
    script.push(OP_DUP);
    script.push(OP_HASH160);
    script.push(0x14); // Push 20 bytes
    script.extend_from_slice(pubkey_hash);
    script.push(OP_EQUALVERIFY);
    script.push(OP_CHECKSIG);
    script
}

/// Decode a P2PKH address and build the script that pays to it.
pub fn pay_to_address_script(address: &str, network: BtcNetwork) -> Result<Vec<u8>, BtcError> {
    let pubkey_hash = address::address_to_pubkey_hash(address, network)?;
    Ok(p2pkh_script(&pubkey_hash))
}

/// Return the public key hash embedded in a canonical P2PKH script.
///
/// Anything other than the exact 25-byte pattern yields `None`; the caller
/// cannot tell which key would satisfy such a script.
pub fn extract_pubkey_hash(script: &[u8]) -> Option<[u8; 20]> {
    match script {
        [OP_DUP, OP_HASH160, 0x14, hash @ .., OP_EQUALVERIFY, OP_CHECKSIG]
            if script.len() == P2PKH_SCRIPT_LEN =>
        {
            let mut out = [0u8; 20];
            out.copy_from_slice(hash);
            Some(out)
        }
        _ => None,
    }
}

/// Append a minimal data push of `data` to `script`.
pub fn push_data(script: &mut Vec<u8>, data: &[u8]) {
    let len = data.len();
    if len < OP_PUSHDATA1 as usize {
        script.push(len as u8);
    } else if len <= 0xFF {
        script.push(OP_PUSHDATA1);
        script.push(len as u8);
    } else if len <= 0xFFFF {
        script.push(OP_PUSHDATA2);
        script.extend_from_slice(&(len as u16).to_le_bytes());
    } else {
        script.push(OP_PUSHDATA4);
        script.extend_from_slice(&(len as u32).to_le_bytes());
    }
    script.extend_from_slice(data);
}

/// P2PKH scriptSig: <sig + sighash byte> <pubkey>
pub fn p2pkh_script_sig(signature_with_hashtype: &[u8], pubkey: &[u8]) -> Vec<u8> {
    let mut script_sig = Vec::with_capacity(signature_with_hashtype.len() + pubkey.len() + 2);
    push_data(&mut script_sig, signature_with_hashtype);
    push_data(&mut script_sig, pubkey);
    script_sig
}
