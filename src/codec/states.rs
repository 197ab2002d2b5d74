//! `StateCodec` implementations for the four covenant states

use super::{StateCodec, StateReader, StateWriter};
use crate::errors::{CodecError, CodecResult};
use crate::types::admin::MAX_ADMIN_TAG_LEN;
use crate::types::{
    AdminState, GuardState, GuardVariant, OpenMinterState, OwnerAddr, ScriptHash, TokenState,
};
use bitcoin::ScriptBuf;

fn read_owner(reader: &mut StateReader<'_>, field: &'static str) -> CodecResult<OwnerAddr> {
    let bytes = reader.read_var_bytes(field)?;
    OwnerAddr::from_bytes(&bytes).ok_or_else(|| CodecError::InvalidValue {
        field,
        reason: format!(
            "expected a 25-byte P2PKH script or 32-byte script hash, got {} bytes",
            bytes.len()
        ),
    })
}

/// `owner(var) ‖ amount(u64)`
impl StateCodec for TokenState {
    fn serialize(&self) -> Vec<u8> {
        StateWriter::new()
            .put_var_bytes(&self.owner.to_bytes())
            .put_u64(self.amount)
            .finish()
    }

    fn deserialize(bytes: &[u8]) -> CodecResult<Self> {
        let mut reader = StateReader::new(bytes);
        let owner = read_owner(&mut reader, "owner")?;
        let amount = reader.read_u64("amount")?;
        reader.finish()?;
        Ok(Self { owner, amount })
    }
}

/// `K(u8) ‖ N(u8) ‖ K × hash(var) ‖ N × index(i8) ‖ deployer(var)`
impl StateCodec for GuardState {
    fn serialize(&self) -> Vec<u8> {
        let mut writer = StateWriter::new();
        writer
            .put_u8(self.token_script_hashes.len() as u8)
            .put_u8(self.token_script_indexes.len() as u8);
        for hash in &self.token_script_hashes {
            match hash {
                Some(hash) => writer.put_var_bytes(hash.as_bytes()),
                None => writer.put_var_bytes(&[]),
            };
        }
        for &index in &self.token_script_indexes {
            writer.put_i8(index);
        }
        writer.put_var_bytes(self.deployer_addr.as_bytes());
        writer.finish()
    }

    fn deserialize(bytes: &[u8]) -> CodecResult<Self> {
        let mut reader = StateReader::new(bytes);
        let type_count = reader.read_u8("type_capacity")? as usize;
        let input_count = reader.read_u8("input_capacity")? as usize;
        if GuardVariant::from_capacities(input_count, type_count).is_none() {
            return Err(CodecError::InvalidValue {
                field: "capacity",
                reason: format!(
                    "no guard variant with {} inputs and {} token types",
                    input_count, type_count
                ),
            });
        }

        let mut token_script_hashes = Vec::with_capacity(type_count);
        for _ in 0..type_count {
            let raw = reader.read_var_bytes("token_script_hash")?;
            let slot = match raw.len() {
                0 => None,
                _ => Some(ScriptHash::from_slice(&raw).ok_or_else(|| {
                    CodecError::InvalidValue {
                        field: "token_script_hash",
                        reason: format!("expected 0 or 32 bytes, got {}", raw.len()),
                    }
                })?),
            };
            token_script_hashes.push(slot);
        }

        let mut token_script_indexes = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            token_script_indexes.push(reader.read_i8("token_script_index")?);
        }

        let deployer_addr = ScriptBuf::from_bytes(reader.read_var_bytes("deployer_addr")?);
        reader.finish()?;

        let state = Self {
            token_script_hashes,
            token_script_indexes,
            deployer_addr,
        };
        state
            .validate_shape()
            .map_err(|e| CodecError::InvalidValue {
                field: "guard_state",
                reason: e.message().to_string(),
            })?;
        Ok(state)
    }
}

/// `token_script_hash(32) ‖ has_minted_before(u8) ‖ remaining_count(u64)`
impl StateCodec for OpenMinterState {
    fn serialize(&self) -> Vec<u8> {
        StateWriter::new()
            .put_fixed(self.token_script_hash.as_bytes())
            .put_bool(self.has_minted_before)
            .put_u64(self.remaining_count)
            .finish()
    }

    fn deserialize(bytes: &[u8]) -> CodecResult<Self> {
        let mut reader = StateReader::new(bytes);
        let token_script_hash = ScriptHash(reader.read_array32("token_script_hash")?);
        let has_minted_before = reader.read_bool("has_minted_before")?;
        let remaining_count = reader.read_u64("remaining_count")?;
        reader.finish()?;
        Ok(Self {
            token_script_hash,
            has_minted_before,
            remaining_count,
        })
    }
}

/// `tag(var) ‖ owner(var)`
impl StateCodec for AdminState {
    fn serialize(&self) -> Vec<u8> {
        StateWriter::new()
            .put_var_bytes(self.tag())
            .put_var_bytes(&self.owner_address().to_bytes())
            .finish()
    }

    fn deserialize(bytes: &[u8]) -> CodecResult<Self> {
        let mut reader = StateReader::new(bytes);
        let tag = reader.read_var_bytes("tag")?;
        if tag.len() > MAX_ADMIN_TAG_LEN {
            return Err(CodecError::InvalidValue {
                field: "tag",
                reason: format!("{} bytes exceeds {}", tag.len(), MAX_ADMIN_TAG_LEN),
            });
        }
        let owner = read_owner(&mut reader, "owner_address")?;
        reader.finish()?;
        AdminState::new(tag, owner).map_err(|e| CodecError::InvalidValue {
            field: "admin_state",
            reason: e.message().to_string(),
        })
    }
}
