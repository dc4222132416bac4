//! Request encoding and response validation.
//!
//! Wire format:
//! - READ request: `[READ + bank, address]`
//! - WRITE request: `[WRITE + bank, address, value, checksum]`
//! - READ response: `[checksum, value]`, checksum over `READ + bank + address + value`
//! - WRITE response: `[address, value]`
//!
//! All checksums are byte sums truncated to 8 bits.

use crate::config::{OpcodeTable, WriteAck};
use crate::constants::{READ_REQUEST_LEN, WRITE_REQUEST_LEN};
use crate::error::{PelletError, Result};
use crate::types::{Command, Operation};

/// Byte sum truncated to 8 bits
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Encode a command into request bytes
pub fn encode(command: &Command, opcodes: &OpcodeTable) -> Vec<u8> {
    let parameter = command.parameter();
    let bank = opcodes.bank_byte(parameter.bank);

    match (command.operation(), command.raw_value()) {
        (Operation::Write, Some(value)) => {
            let header = [opcodes.write.wrapping_add(bank), parameter.address, value];
            let mut request = Vec::with_capacity(WRITE_REQUEST_LEN);
            request.extend_from_slice(&header);
            request.push(checksum(&header));
            request
        }
        _ => {
            let mut request = Vec::with_capacity(READ_REQUEST_LEN);
            request.push(opcodes.read.wrapping_add(bank));
            request.push(parameter.address);
            request
        }
    }
}

/// Validate a response to `command` and return the raw value it carries
pub fn decode(
    command: &Command,
    response: [u8; 2],
    opcodes: &OpcodeTable,
    write_ack: WriteAck,
) -> Result<u8> {
    let parameter = command.parameter();
    let [b0, b1] = response;

    match (command.operation(), command.raw_value()) {
        (Operation::Write, Some(written)) => {
            if write_ack == WriteAck::AddressAndValue && b0 != parameter.address {
                return Err(PelletError::ChecksumMismatch {
                    expected: parameter.address,
                    actual: b0,
                });
            }
            if b1 != written {
                return Err(PelletError::ChecksumMismatch {
                    expected: written,
                    actual: b1,
                });
            }
            Ok(b1)
        }
        _ => {
            let bank = opcodes.bank_byte(parameter.bank);
            let expected = checksum(&[opcodes.read, bank, parameter.address, b1]);
            if b0 != expected {
                return Err(PelletError::ChecksumMismatch {
                    expected,
                    actual: b0,
                });
            }
            Ok(b1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bank, ParameterDescriptor};
    use pretty_assertions::assert_eq;

    fn stage() -> ParameterDescriptor {
        ParameterDescriptor::new("stage", Bank::Ram, 0x21, 1.0, 0.0)
    }

    fn power() -> ParameterDescriptor {
        ParameterDescriptor::new("power", Bank::Epr, 0x7F, 1.0, 0.0)
    }

    #[test]
    fn test_encode_read() {
        let opcodes = OpcodeTable::default();
        assert_eq!(encode(&Command::read(stage()), &opcodes), vec![0x00, 0x21]);
        assert_eq!(encode(&Command::read(power()), &opcodes), vec![0x20, 0x7F]);
    }

    #[test]
    fn test_encode_write_checksum() {
        let opcodes = OpcodeTable::default();
        // 0xA0 + 0x7F + 0x03 = 0x122
        assert_eq!(
            encode(&Command::write(power(), 3), &opcodes),
            vec![0xA0, 0x7F, 0x03, 0x22]
        );
    }

    #[test]
    fn test_write_checksum_for_all_values() {
        let opcodes = OpcodeTable::default();
        for bank in [Bank::Ram, Bank::Epr] {
            for address in [0x00u8, 0x21, 0x7D, 0xFF] {
                for value in 0..=255u8 {
                    let parameter = ParameterDescriptor::new("p", bank, address, 1.0, 0.0);
                    let request = encode(&Command::write(parameter, value), &opcodes);
                    let sum = 0x80u32 + opcodes.bank_byte(bank) as u32 + address as u32 + value as u32;
                    assert_eq!(request[3], (sum & 0xFF) as u8);
                }
            }
        }
    }

    #[test]
    fn test_decode_read_accepts_valid_checksum() {
        let opcodes = OpcodeTable::default();
        let command = Command::read(stage());
        // 0x00 + 0x00 + 0x21 + 0x05
        assert_eq!(
            decode(&command, [0x26, 0x05], &opcodes, WriteAck::EchoValue).unwrap(),
            5
        );
    }

    #[test]
    fn test_decode_read_rejects_corrupt_checksum() {
        let opcodes = OpcodeTable::default();
        let command = Command::read(stage());
        let err = decode(&command, [0x21, 0x05], &opcodes, WriteAck::EchoValue).unwrap_err();
        match err {
            PelletError::ChecksumMismatch { expected, actual } => {
                assert_eq!(expected, 0x26);
                assert_eq!(actual, 0x21);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_read_epr_includes_bank() {
        let opcodes = OpcodeTable::default();
        let command = Command::read(power());
        // 0x20 + 0x7F + 0x04 = 0xA3
        assert_eq!(
            decode(&command, [0xA3, 0x04], &opcodes, WriteAck::EchoValue).unwrap(),
            4
        );
    }

    #[test]
    fn test_decode_write_echo() {
        let opcodes = OpcodeTable::default();
        let command = Command::write(power(), 3);
        assert_eq!(
            decode(&command, [0x00, 0x03], &opcodes, WriteAck::EchoValue).unwrap(),
            3
        );
        assert!(decode(&command, [0x7F, 0x04], &opcodes, WriteAck::EchoValue).is_err());
    }

    #[test]
    fn test_decode_write_address_and_value() {
        let opcodes = OpcodeTable::default();
        let command = Command::write(power(), 3);
        assert!(decode(&command, [0x7F, 0x03], &opcodes, WriteAck::AddressAndValue).is_ok());
        assert!(decode(&command, [0x00, 0x03], &opcodes, WriteAck::AddressAndValue).is_err());
    }
}
