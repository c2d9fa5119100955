use lazy_static::lazy_static;

use super::instruction::{
    AluOp, Cond, Indirect, Instruction, Reg16, Reg8, ShiftOp, StackPair,
};
use crate::error::DecodeError;

/// First byte of every two-byte bit/rotate instruction.
pub const PREFIX_BYTE: u8 = 0xCB;

lazy_static! {
    static ref UNPREFIXED: [Option<Instruction>; 256] =
        std::array::from_fn(|opcode| classify_unprefixed(opcode as u8));
    static ref PREFIXED: [Instruction; 256] =
        std::array::from_fn(|opcode| classify_prefixed(opcode as u8));
}

/// Map an opcode byte to its instruction.
///
/// `prefixed` selects the 0xCB table. The non-prefixed table has holes at
/// 0xCB itself and the eleven opcodes the hardware leaves undefined.
pub fn decode(opcode: u8, prefixed: bool) -> Result<Instruction, DecodeError> {
    if prefixed {
        return Ok(PREFIXED[opcode as usize]);
    }
    UNPREFIXED[opcode as usize].ok_or(DecodeError { opcode, prefixed })
}

/// Decode by bit fields: `xx yyy zzz`, with `yyy` split into `pp q`.
fn classify_unprefixed(opcode: u8) -> Option<Instruction> {
    use Instruction::*;

    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;
    let p = y >> 1;
    let q = y & 0x01;

    let instruction = match (x, z) {
        (0, 0) => match y {
            0 => Nop,
            1 => StoreSp,
            2 => Stop,
            3 => Jr,
            _ => JrIf(Cond::from_index(y - 4)),
        },
        (0, 1) if q == 0 => LdImm16 { dst: Reg16::from_index(p) },
        (0, 1) => AddHl { src: Reg16::from_index(p) },
        (0, 2) if q == 0 => StoreA { dst: Indirect::from_index(p) },
        (0, 2) => LoadA { src: Indirect::from_index(p) },
        (0, 3) if q == 0 => Inc16 { reg: Reg16::from_index(p) },
        (0, 3) => Dec16 { reg: Reg16::from_index(p) },
        (0, 4) => Inc { reg: Reg8::from_index(y) },
        (0, 5) => Dec { reg: Reg8::from_index(y) },
        (0, 6) => LdImm8 { dst: Reg8::from_index(y) },
        (0, _) => [Rlca, Rrca, Rla, Rra, Daa, Cpl, Scf, Ccf][y as usize],

        // 0x76 sits where LD (HL),(HL) would be.
        (1, _) if opcode == 0x76 => Halt,
        (1, _) => Ld {
            dst: Reg8::from_index(y),
            src: Reg8::from_index(z),
        },

        (2, _) => Alu {
            op: AluOp::from_index(y),
            src: Reg8::from_index(z),
        },

        (_, 0) => match y {
            0..=3 => RetIf(Cond::from_index(y)),
            4 => LdhStore,
            5 => AddSpOffset,
            6 => LdhLoad,
            _ => LdHlSpOffset,
        },
        (_, 1) if q == 0 => Pop(StackPair::from_index(p)),
        (_, 1) => match p {
            0 => Ret,
            1 => Reti,
            2 => JpHl,
            _ => LdSpHl,
        },
        (_, 2) => match y {
            0..=3 => JpIf(Cond::from_index(y)),
            4 => LdhStoreC,
            5 => StoreAbs,
            6 => LdhLoadC,
            _ => LoadAbs,
        },
        (_, 3) => match y {
            0 => Jp,
            6 => Di,
            7 => Ei,
            // 0xCB prefix, 0xD3, 0xDB, 0xE3, 0xEB
            _ => return None,
        },
        (_, 4) if y <= 3 => CallIf(Cond::from_index(y)),
        // 0xE4, 0xEC, 0xF4, 0xFC
        (_, 4) => return None,
        (_, 5) if q == 0 => Push(StackPair::from_index(p)),
        (_, 5) if p == 0 => Call,
        // 0xDD, 0xED, 0xFD
        (_, 5) => return None,
        (_, 6) => AluImm {
            op: AluOp::from_index(y),
        },
        (_, _) => Rst(y * 8),
    };
    Some(instruction)
}

fn classify_prefixed(opcode: u8) -> Instruction {
    let y = (opcode >> 3) & 0x07;
    let reg = Reg8::from_index(opcode & 0x07);
    match opcode >> 6 {
        0 => Instruction::Shift {
            op: ShiftOp::from_index(y),
            reg,
        },
        1 => Instruction::Bit { bit: y, reg },
        2 => Instruction::Res { bit: y, reg },
        _ => Instruction::Set { bit: y, reg },
    }
}
