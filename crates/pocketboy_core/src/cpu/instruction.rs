use std::fmt;

/// 8-bit operand slot, in opcode-table order: 0=B, 1=C, 2=D, 3=E, 4=H,
/// 5=L, 6=(HL), 7=A.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg8 {
    B,
    C,
    D,
    E,
    H,
    L,
    HlInd,
    A,
}

impl Reg8 {
    const ALL: [Reg8; 8] = [
        Reg8::B,
        Reg8::C,
        Reg8::D,
        Reg8::E,
        Reg8::H,
        Reg8::L,
        Reg8::HlInd,
        Reg8::A,
    ];

    #[inline]
    pub(super) fn from_index(index: u8) -> Self {
        Self::ALL[(index & 0x07) as usize]
    }

    /// True for the `(HL)` memory operand.
    #[inline]
    pub fn is_memory(self) -> bool {
        self == Reg8::HlInd
    }
}

impl fmt::Display for Reg8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reg8::B => "B",
            Reg8::C => "C",
            Reg8::D => "D",
            Reg8::E => "E",
            Reg8::H => "H",
            Reg8::L => "L",
            Reg8::HlInd => "(HL)",
            Reg8::A => "A",
        })
    }
}

/// 16-bit pair used by loads and arithmetic: BC, DE, HL, SP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg16 {
    Bc,
    De,
    Hl,
    Sp,
}

impl Reg16 {
    #[inline]
    pub(super) fn from_index(index: u8) -> Self {
        [Reg16::Bc, Reg16::De, Reg16::Hl, Reg16::Sp][(index & 0x03) as usize]
    }
}

impl fmt::Display for Reg16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reg16::Bc => "BC",
            Reg16::De => "DE",
            Reg16::Hl => "HL",
            Reg16::Sp => "SP",
        })
    }
}

/// 16-bit pair used by PUSH/POP: BC, DE, HL, AF.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StackPair {
    Bc,
    De,
    Hl,
    Af,
}

impl StackPair {
    #[inline]
    pub(super) fn from_index(index: u8) -> Self {
        [StackPair::Bc, StackPair::De, StackPair::Hl, StackPair::Af][(index & 0x03) as usize]
    }
}

impl fmt::Display for StackPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StackPair::Bc => "BC",
            StackPair::De => "DE",
            StackPair::Hl => "HL",
            StackPair::Af => "AF",
        })
    }
}

/// Pointer operand of `LD (rr),A` / `LD A,(rr)`. The HL forms adjust HL
/// after the access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Indirect {
    Bc,
    De,
    HlInc,
    HlDec,
}

impl Indirect {
    #[inline]
    pub(super) fn from_index(index: u8) -> Self {
        [Indirect::Bc, Indirect::De, Indirect::HlInc, Indirect::HlDec][(index & 0x03) as usize]
    }
}

impl fmt::Display for Indirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Indirect::Bc => "(BC)",
            Indirect::De => "(DE)",
            Indirect::HlInc => "(HL+)",
            Indirect::HlDec => "(HL-)",
        })
    }
}

/// Branch condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cond {
    Nz,
    Z,
    Nc,
    C,
}

impl Cond {
    #[inline]
    pub(super) fn from_index(index: u8) -> Self {
        [Cond::Nz, Cond::Z, Cond::Nc, Cond::C][(index & 0x03) as usize]
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cond::Nz => "NZ",
            Cond::Z => "Z",
            Cond::Nc => "NC",
            Cond::C => "C",
        })
    }
}

/// Accumulator operation in the 0x80–0xBF block and its immediate forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    #[inline]
    pub(super) fn from_index(index: u8) -> Self {
        [
            AluOp::Add,
            AluOp::Adc,
            AluOp::Sub,
            AluOp::Sbc,
            AluOp::And,
            AluOp::Xor,
            AluOp::Or,
            AluOp::Cp,
        ][(index & 0x07) as usize]
    }

    fn prefix(self) -> &'static str {
        match self {
            AluOp::Add => "ADD A,",
            AluOp::Adc => "ADC A,",
            AluOp::Sub => "SUB ",
            AluOp::Sbc => "SBC A,",
            AluOp::And => "AND ",
            AluOp::Xor => "XOR ",
            AluOp::Or => "OR ",
            AluOp::Cp => "CP ",
        }
    }
}

/// Rotate/shift group of the prefixed table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl ShiftOp {
    #[inline]
    pub(super) fn from_index(index: u8) -> Self {
        [
            ShiftOp::Rlc,
            ShiftOp::Rrc,
            ShiftOp::Rl,
            ShiftOp::Rr,
            ShiftOp::Sla,
            ShiftOp::Sra,
            ShiftOp::Swap,
            ShiftOp::Srl,
        ][(index & 0x07) as usize]
    }
}

impl fmt::Display for ShiftOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShiftOp::Rlc => "RLC",
            ShiftOp::Rrc => "RRC",
            ShiftOp::Rl => "RL",
            ShiftOp::Rr => "RR",
            ShiftOp::Sla => "SLA",
            ShiftOp::Sra => "SRA",
            ShiftOp::Swap => "SWAP",
            ShiftOp::Srl => "SRL",
        })
    }
}

/// Immediate bytes that follow the opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandKind {
    None,
    Byte,
    Word,
}

/// Cost in machine cycles. `taken` differs from `base` only for
/// conditional control transfers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    pub base: u8,
    pub taken: u8,
}

impl Timing {
    const fn fixed(cycles: u8) -> Self {
        Self {
            base: cycles,
            taken: cycles,
        }
    }

    const fn branch(base: u8, taken: u8) -> Self {
        Self { base, taken }
    }
}

/// A decoded SM83 instruction.
///
/// Variants carry only what the opcode byte encodes; immediates are read
/// from memory at execution time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instruction {
    Nop,
    Stop,
    Halt,
    Di,
    Ei,

    /// `LD r,r'` including the `(HL)` forms.
    Ld { dst: Reg8, src: Reg8 },
    /// `LD r,d8`
    LdImm8 { dst: Reg8 },
    /// `LD rr,d16`
    LdImm16 { dst: Reg16 },
    /// `LD (rr),A`
    StoreA { dst: Indirect },
    /// `LD A,(rr)`
    LoadA { src: Indirect },
    /// `LD (a16),SP`
    StoreSp,
    /// `LDH (a8),A`
    LdhStore,
    /// `LDH A,(a8)`
    LdhLoad,
    /// `LD (C),A`
    LdhStoreC,
    /// `LD A,(C)`
    LdhLoadC,
    /// `LD (a16),A`
    StoreAbs,
    /// `LD A,(a16)`
    LoadAbs,
    /// `LD HL,SP+r8`
    LdHlSpOffset,
    LdSpHl,

    Alu { op: AluOp, src: Reg8 },
    AluImm { op: AluOp },
    Inc { reg: Reg8 },
    Dec { reg: Reg8 },
    Inc16 { reg: Reg16 },
    Dec16 { reg: Reg16 },
    AddHl { src: Reg16 },
    /// `ADD SP,r8`
    AddSpOffset,
    Rlca,
    Rrca,
    Rla,
    Rra,
    Daa,
    Cpl,
    Scf,
    Ccf,

    Jr,
    JrIf(Cond),
    Jp,
    JpIf(Cond),
    JpHl,
    Call,
    CallIf(Cond),
    Ret,
    RetIf(Cond),
    Reti,
    /// Restart to a fixed vector (0x00, 0x08, ..., 0x38).
    Rst(u8),
    Push(StackPair),
    Pop(StackPair),

    Shift { op: ShiftOp, reg: Reg8 },
    Bit { bit: u8, reg: Reg8 },
    Res { bit: u8, reg: Reg8 },
    Set { bit: u8, reg: Reg8 },
}

impl Instruction {
    /// Whether this instruction lives in the 0xCB table.
    #[inline]
    pub fn is_prefixed(&self) -> bool {
        matches!(
            self,
            Instruction::Shift { .. }
                | Instruction::Bit { .. }
                | Instruction::Res { .. }
                | Instruction::Set { .. }
        )
    }

    pub fn operand(&self) -> OperandKind {
        use Instruction::*;
        match self {
            Stop | LdImm8 { .. } | LdhStore | LdhLoad | LdHlSpOffset | AluImm { .. }
            | AddSpOffset | Jr | JrIf(_) => OperandKind::Byte,
            LdImm16 { .. } | StoreSp | StoreAbs | LoadAbs | Jp | JpIf(_) | Call | CallIf(_) => {
                OperandKind::Word
            }
            _ => OperandKind::None,
        }
    }

    /// Encoded length in bytes, including the 0xCB prefix.
    #[inline]
    pub fn length(&self) -> u16 {
        if self.is_prefixed() {
            return 2;
        }
        match self.operand() {
            OperandKind::None => 1,
            OperandKind::Byte => 2,
            OperandKind::Word => 3,
        }
    }

    pub fn timing(&self) -> Timing {
        use Instruction::*;
        let mem = |reg: Reg8, with: u8, without: u8| {
            Timing::fixed(if reg.is_memory() { with } else { without })
        };
        match *self {
            Nop | Stop | Halt | Di | Ei => Timing::fixed(1),
            Ld { dst, src } => Timing::fixed(if dst.is_memory() || src.is_memory() { 2 } else { 1 }),
            LdImm8 { dst } => mem(dst, 3, 2),
            LdImm16 { .. } => Timing::fixed(3),
            StoreA { .. } | LoadA { .. } => Timing::fixed(2),
            StoreSp => Timing::fixed(5),
            LdhStore | LdhLoad => Timing::fixed(3),
            LdhStoreC | LdhLoadC => Timing::fixed(2),
            StoreAbs | LoadAbs => Timing::fixed(4),
            LdHlSpOffset => Timing::fixed(3),
            LdSpHl => Timing::fixed(2),

            Alu { src, .. } => mem(src, 2, 1),
            AluImm { .. } => Timing::fixed(2),
            Inc { reg } | Dec { reg } => mem(reg, 3, 1),
            Inc16 { .. } | Dec16 { .. } | AddHl { .. } => Timing::fixed(2),
            AddSpOffset => Timing::fixed(4),
            Rlca | Rrca | Rla | Rra | Daa | Cpl | Scf | Ccf => Timing::fixed(1),

            Jr => Timing::fixed(3),
            JrIf(_) => Timing::branch(2, 3),
            Jp => Timing::fixed(4),
            JpIf(_) => Timing::branch(3, 4),
            JpHl => Timing::fixed(1),
            Call => Timing::fixed(6),
            CallIf(_) => Timing::branch(3, 6),
            Ret | Reti => Timing::fixed(4),
            RetIf(_) => Timing::branch(2, 5),
            Rst(_) | Push(_) => Timing::fixed(4),
            Pop(_) => Timing::fixed(3),

            Shift { reg, .. } | Res { reg, .. } | Set { reg, .. } => mem(reg, 4, 2),
            Bit { reg, .. } => mem(reg, 3, 2),
        }
    }

    /// Encoding of this instruction. Prefixed instructions are `0xCBnn`.
    pub fn opcode(&self) -> u16 {
        use Instruction::*;
        let r = |reg: Reg8| reg as u16;
        match *self {
            Nop => 0x00,
            Stop => 0x10,
            Halt => 0x76,
            Di => 0xF3,
            Ei => 0xFB,

            Ld { dst, src } => 0x40 | r(dst) << 3 | r(src),
            LdImm8 { dst } => 0x06 | r(dst) << 3,
            LdImm16 { dst } => 0x01 | (dst as u16) << 4,
            StoreA { dst } => 0x02 | (dst as u16) << 4,
            LoadA { src } => 0x0A | (src as u16) << 4,
            StoreSp => 0x08,
            LdhStore => 0xE0,
            LdhLoad => 0xF0,
            LdhStoreC => 0xE2,
            LdhLoadC => 0xF2,
            StoreAbs => 0xEA,
            LoadAbs => 0xFA,
            LdHlSpOffset => 0xF8,
            LdSpHl => 0xF9,

            Alu { op, src } => 0x80 | (op as u16) << 3 | r(src),
            AluImm { op } => 0xC6 | (op as u16) << 3,
            Inc { reg } => 0x04 | r(reg) << 3,
            Dec { reg } => 0x05 | r(reg) << 3,
            Inc16 { reg } => 0x03 | (reg as u16) << 4,
            Dec16 { reg } => 0x0B | (reg as u16) << 4,
            AddHl { src } => 0x09 | (src as u16) << 4,
            AddSpOffset => 0xE8,
            Rlca => 0x07,
            Rrca => 0x0F,
            Rla => 0x17,
            Rra => 0x1F,
            Daa => 0x27,
            Cpl => 0x2F,
            Scf => 0x37,
            Ccf => 0x3F,

            Jr => 0x18,
            JrIf(cond) => 0x20 | (cond as u16) << 3,
            Jp => 0xC3,
            JpIf(cond) => 0xC2 | (cond as u16) << 3,
            JpHl => 0xE9,
            Call => 0xCD,
            CallIf(cond) => 0xC4 | (cond as u16) << 3,
            Ret => 0xC9,
            RetIf(cond) => 0xC0 | (cond as u16) << 3,
            Reti => 0xD9,
            Rst(vector) => 0xC7 | vector as u16,
            Push(pair) => 0xC5 | (pair as u16) << 4,
            Pop(pair) => 0xC1 | (pair as u16) << 4,

            Shift { op, reg } => 0xCB00 | (op as u16) << 3 | r(reg),
            Bit { bit, reg } => 0xCB40 | (bit as u16) << 3 | r(reg),
            Res { bit, reg } => 0xCB80 | (bit as u16) << 3 | r(reg),
            Set { bit, reg } => 0xCBC0 | (bit as u16) << 3 | r(reg),
        }
    }

    /// Identifier used in diagnostics, e.g. `0x00__NOP` or `0xCB11__RL C`.
    pub fn diagnostic_name(&self) -> String {
        if self.is_prefixed() {
            format!("0x{:04X}__{}", self.opcode(), self)
        } else {
            format!("0x{:02X}__{}", self.opcode(), self)
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match self {
            Nop => f.write_str("NOP"),
            Stop => f.write_str("STOP"),
            Halt => f.write_str("HALT"),
            Di => f.write_str("DI"),
            Ei => f.write_str("EI"),

            Ld { dst, src } => write!(f, "LD {dst},{src}"),
            LdImm8 { dst } => write!(f, "LD {dst},d8"),
            LdImm16 { dst } => write!(f, "LD {dst},d16"),
            StoreA { dst } => write!(f, "LD {dst},A"),
            LoadA { src } => write!(f, "LD A,{src}"),
            StoreSp => f.write_str("LD (a16),SP"),
            LdhStore => f.write_str("LDH (a8),A"),
            LdhLoad => f.write_str("LDH A,(a8)"),
            LdhStoreC => f.write_str("LD (C),A"),
            LdhLoadC => f.write_str("LD A,(C)"),
            StoreAbs => f.write_str("LD (a16),A"),
            LoadAbs => f.write_str("LD A,(a16)"),
            LdHlSpOffset => f.write_str("LD HL,SP+r8"),
            LdSpHl => f.write_str("LD SP,HL"),

            Alu { op, src } => write!(f, "{}{src}", op.prefix()),
            AluImm { op } => write!(f, "{}d8", op.prefix()),
            Inc { reg } => write!(f, "INC {reg}"),
            Dec { reg } => write!(f, "DEC {reg}"),
            Inc16 { reg } => write!(f, "INC {reg}"),
            Dec16 { reg } => write!(f, "DEC {reg}"),
            AddHl { src } => write!(f, "ADD HL,{src}"),
            AddSpOffset => f.write_str("ADD SP,r8"),
            Rlca => f.write_str("RLCA"),
            Rrca => f.write_str("RRCA"),
            Rla => f.write_str("RLA"),
            Rra => f.write_str("RRA"),
            Daa => f.write_str("DAA"),
            Cpl => f.write_str("CPL"),
            Scf => f.write_str("SCF"),
            Ccf => f.write_str("CCF"),

            Jr => f.write_str("JR r8"),
            JrIf(cond) => write!(f, "JR {cond},r8"),
            Jp => f.write_str("JP a16"),
            JpIf(cond) => write!(f, "JP {cond},a16"),
            JpHl => f.write_str("JP (HL)"),
            Call => f.write_str("CALL a16"),
            CallIf(cond) => write!(f, "CALL {cond},a16"),
            Ret => f.write_str("RET"),
            RetIf(cond) => write!(f, "RET {cond}"),
            Reti => f.write_str("RETI"),
            Rst(vector) => write!(f, "RST {vector:02X}H"),
            Push(pair) => write!(f, "PUSH {pair}"),
            Pop(pair) => write!(f, "POP {pair}"),

            Shift { op, reg } => write!(f, "{op} {reg}"),
            Bit { bit, reg } => write!(f, "BIT {bit},{reg}"),
            Res { bit, reg } => write!(f, "RES {bit},{reg}"),
            Set { bit, reg } => write!(f, "SET {bit},{reg}"),
        }
    }
}
