use super::*;
use crate::error::{CpuError, DecodeError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct TestBus {
    memory: [u8; 0x10000],
}

impl Default for TestBus {
    fn default() -> Self {
        Self {
            memory: [0; 0x10000],
        }
    }
}

impl Bus for TestBus {
    fn read8(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }
}

/// Records every write in order on top of a flat memory.
#[derive(Default)]
struct RecordingBus {
    inner: TestBus,
    writes: Vec<(u16, u8)>,
}

impl Bus for RecordingBus {
    fn read8(&mut self, addr: u16) -> u8 {
        self.inner.read8(addr)
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.writes.push((addr, value));
        self.inner.write8(addr, value);
    }
}

fn setup(program: &[u8], at: u16) -> (Cpu, TestBus) {
    setup_with(CpuConfig::default(), program, at)
}

fn setup_with(config: CpuConfig, program: &[u8], at: u16) -> (Cpu, TestBus) {
    let mut cpu = Cpu::with_config(config);
    let mut bus = TestBus::default();
    cpu.regs.pc = at;
    cpu.clear_flags();
    let start = at as usize;
    bus.memory[start..start + program.len()].copy_from_slice(program);
    (cpu, bus)
}

fn flags(cpu: &Cpu) -> (bool, bool, bool, bool) {
    (
        cpu.get_flag(Flag::Z),
        cpu.get_flag(Flag::N),
        cpu.get_flag(Flag::H),
        cpu.get_flag(Flag::C),
    )
}

#[test]
fn new_cpu_matches_dmg_post_boot_state() {
    let cpu = Cpu::new();
    assert_eq!(cpu.regs.af(), 0x01B0);
    assert_eq!(cpu.regs.bc(), 0x0013);
    assert_eq!(cpu.regs.de(), 0x00D8);
    assert_eq!(cpu.regs.hl(), 0x014D);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert_eq!(cpu.regs.pc, 0x0100);
    assert!(!cpu.ime);
    assert!(!cpu.halted);
}

#[test]
fn add_a_b_sets_zero_half_and_carry() {
    let (mut cpu, mut bus) = setup(&[0x80], 0x0100);
    cpu.regs.a = 0x3A;
    cpu.regs.b = 0xC6;

    assert_eq!(cpu.step(&mut bus), Ok(1));
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(flags(&cpu), (true, false, true, true));
    assert_eq!(cpu.regs.pc, 0x0101);
    assert_eq!(cpu.cycles(), 1);
}

#[test]
fn call_pushes_return_address_and_jumps() {
    let (mut cpu, mut bus) = setup(&[0xCD, 0x34, 0x12], 0x0200);
    cpu.regs.sp = 0xFFFE;

    assert_eq!(cpu.step(&mut bus), Ok(6));
    assert_eq!(cpu.regs.pc, 0x1234);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(bus.memory[0xFFFD], 0x02);
    assert_eq!(bus.memory[0xFFFC], 0x03);

    // RET brings us back after the CALL.
    bus.memory[0x1234] = 0xC9;
    assert_eq!(cpu.step(&mut bus), Ok(4));
    assert_eq!(cpu.regs.pc, 0x0203);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn add_a_b_without_overflow() {
    let (mut cpu, mut bus) = setup(&[0x80], 0x0100);
    cpu.regs.a = 0x3C;
    cpu.regs.b = 0x2A;

    assert_eq!(cpu.step(&mut bus), Ok(1));
    assert_eq!(cpu.regs.a, 0x66);
    assert_eq!(flags(&cpu), (false, false, true, false));
}

#[test]
fn call_from_entry_point_pushes_0103() {
    let (mut cpu, mut bus) = setup(&[0xCD, 0x00, 0x10], 0x0100);
    cpu.regs.sp = 0xFFFE;

    assert_eq!(cpu.step(&mut bus), Ok(6));
    assert_eq!(cpu.regs.pc, 0x1000);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(bus.memory[0xFFFC], 0x03);
    assert_eq!(bus.memory[0xFFFD], 0x01);
}

#[test]
fn dec_a_wraps_from_zero() {
    let (mut cpu, mut bus) = setup(&[0x3D], 0x0100);
    cpu.regs.a = 0x00;
    cpu.set_flag(Flag::C, true);

    assert_eq!(cpu.step(&mut bus), Ok(1));
    assert_eq!(cpu.regs.a, 0xFF);
    assert_eq!(flags(&cpu), (false, true, true, true));
}

#[test]
fn dec_a_borrows_from_bit_four_and_keeps_carry() {
    let (mut cpu, mut bus) = setup(&[0x3D], 0x0100);
    cpu.regs.a = 0x10;
    cpu.set_flag(Flag::C, true);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a, 0x0F);
    assert_eq!(flags(&cpu), (false, true, true, true));
}

#[test]
fn inc_sets_half_carry_on_nibble_overflow() {
    let (mut cpu, mut bus) = setup(&[0x3C, 0x3C], 0x0100);
    cpu.regs.a = 0x0F;
    cpu.set_flag(Flag::C, true);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a, 0x10);
    assert_eq!(flags(&cpu), (false, false, true, true));

    cpu.regs.a = 0xFF;
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(flags(&cpu), (true, false, true, true));
}

#[test]
fn inc_and_dec_through_hl_touch_memory() {
    let (mut cpu, mut bus) = setup(&[0x34, 0x35, 0x35], 0x0100);
    cpu.regs.set_hl(0xC000);
    bus.memory[0xC000] = 0xFF;

    assert_eq!(cpu.step(&mut bus), Ok(3));
    assert_eq!(bus.memory[0xC000], 0x00);
    assert!(cpu.get_flag(Flag::Z));

    assert_eq!(cpu.step(&mut bus), Ok(3));
    assert_eq!(bus.memory[0xC000], 0xFF);
    assert_eq!(flags(&cpu), (false, true, true, false));

    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.memory[0xC000], 0xFE);
    assert!(!cpu.get_flag(Flag::H));
}

/// Flags of `a (op) value` computed with wide integers.
fn reference(op: AluOp, a: u8, value: u8, carry: bool) -> (u8, (bool, bool, bool, bool)) {
    let c = carry as i32;
    let (a, v) = (a as i32, value as i32);
    match op {
        AluOp::Add | AluOp::Adc => {
            let c = if op == AluOp::Adc { c } else { 0 };
            let full = a + v + c;
            let result = (full & 0xFF) as u8;
            let half = (a & 0x0F) + (v & 0x0F) + c > 0x0F;
            (result, (result == 0, false, half, full > 0xFF))
        }
        AluOp::Sub | AluOp::Sbc | AluOp::Cp => {
            let c = if op == AluOp::Sbc { c } else { 0 };
            let full = a - v - c;
            let result = (full & 0xFF) as u8;
            let half = (a & 0x0F) - (v & 0x0F) - c < 0;
            let out = if op == AluOp::Cp { a as u8 } else { result };
            (out, (result == 0, true, half, full < 0))
        }
        _ => unreachable!(),
    }
}

#[test]
fn arithmetic_matches_wide_reference_for_all_inputs() {
    let mut cpu = Cpu::new();
    for op in [AluOp::Add, AluOp::Adc, AluOp::Sub, AluOp::Sbc, AluOp::Cp] {
        for a in 0..=0xFFu8 {
            for value in 0..=0xFFu8 {
                for carry in [false, true] {
                    cpu.regs.a = a;
                    cpu.clear_flags();
                    cpu.set_flag(Flag::C, carry);
                    cpu.alu_op(op, value);

                    let (result, expected) = reference(op, a, value, carry);
                    assert_eq!(cpu.regs.a, result, "{op:?} {a:#04x} {value:#04x} c={carry}");
                    assert_eq!(
                        flags(&cpu),
                        expected,
                        "{op:?} {a:#04x} {value:#04x} c={carry}"
                    );
                }
            }
        }
    }
}

#[test]
fn sub_register_b_mode_subtracts_b_with_operand_flags() {
    let config = CpuConfig::builder()
        .sub_operand(SubOperand::RegisterB)
        .build();
    let (mut cpu, mut bus) = setup_with(config, &[0x91], 0x0100);
    cpu.regs.a = 0x50;
    cpu.regs.b = 0x10;
    cpu.regs.c = 0x05;
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a, 0x40);
    assert_eq!(flags(&cpu), (false, true, true, false));

    let (mut cpu, mut bus) = setup(&[0x91], 0x0100);
    cpu.regs.a = 0x50;
    cpu.regs.b = 0x10;
    cpu.regs.c = 0x05;
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a, 0x4B);
}

#[test]
fn logic_ops_set_expected_flags() {
    // AND d8, XOR A, OR d8
    let (mut cpu, mut bus) = setup(&[0xE6, 0x0F, 0xAF, 0xF6, 0x81], 0x0100);
    cpu.regs.a = 0xF0;
    cpu.set_flag(Flag::C, true);

    assert_eq!(cpu.step(&mut bus), Ok(2));
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(flags(&cpu), (true, false, true, false));

    cpu.regs.a = 0x3C;
    assert_eq!(cpu.step(&mut bus), Ok(1));
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(flags(&cpu), (true, false, false, false));

    assert_eq!(cpu.step(&mut bus), Ok(2));
    assert_eq!(cpu.regs.a, 0x81);
    assert_eq!(flags(&cpu), (false, false, false, false));
}

#[test]
fn bit_test_preserves_carry() {
    // BIT 7,H ; BIT 0,H
    let (mut cpu, mut bus) = setup(&[0xCB, 0x7C, 0xCB, 0x44], 0x0100);
    cpu.regs.h = 0x80;
    cpu.set_flag(Flag::C, true);
    cpu.set_flag(Flag::N, true);

    assert_eq!(cpu.step(&mut bus), Ok(2));
    assert_eq!(flags(&cpu), (false, false, true, true));
    assert_eq!(cpu.regs.pc, 0x0102);

    cpu.step(&mut bus).unwrap();
    assert_eq!(flags(&cpu), (true, false, true, true));
    assert_eq!(cpu.regs.h, 0x80);
}

#[test]
fn res_and_set_through_hl() {
    // SET 3,(HL) ; RES 7,(HL) ; BIT 3,(HL)
    let (mut cpu, mut bus) = setup(&[0xCB, 0xDE, 0xCB, 0xBE, 0xCB, 0x5E], 0x0100);
    cpu.regs.set_hl(0xC010);
    bus.memory[0xC010] = 0x80;

    assert_eq!(cpu.step(&mut bus), Ok(4));
    assert_eq!(bus.memory[0xC010], 0x88);
    assert_eq!(cpu.step(&mut bus), Ok(4));
    assert_eq!(bus.memory[0xC010], 0x08);
    assert_eq!(cpu.step(&mut bus), Ok(3));
    assert!(!cpu.get_flag(Flag::Z));
}

#[test]
fn accumulator_rotate_clears_zero_but_prefixed_rotate_sets_it() {
    // RLA ; RL A
    let (mut cpu, mut bus) = setup(&[0x17, 0xCB, 0x17], 0x0100);
    cpu.regs.a = 0x80;

    assert_eq!(cpu.step(&mut bus), Ok(1));
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(flags(&cpu), (false, false, false, true));
    assert_eq!(cpu.regs.pc, 0x0101);

    cpu.regs.a = 0x80;
    cpu.set_flag(Flag::C, false);
    assert_eq!(cpu.step(&mut bus), Ok(2));
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(flags(&cpu), (true, false, false, true));
    assert_eq!(cpu.regs.pc, 0x0103);
}

#[test]
fn shifts_and_swap() {
    // SRA B ; SRL B ; SWAP B ; RRC B
    let (mut cpu, mut bus) = setup(&[0xCB, 0x28, 0xCB, 0x38, 0xCB, 0x30, 0xCB, 0x08], 0x0100);
    cpu.regs.b = 0x81;

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.b, 0xC0);
    assert!(cpu.get_flag(Flag::C));

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.b, 0x60);
    assert!(!cpu.get_flag(Flag::C));

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.b, 0x06);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.b, 0x03);
    assert_eq!(flags(&cpu), (false, false, false, false));
}

#[test]
fn add_hl_leaves_zero_alone() {
    let (mut cpu, mut bus) = setup(&[0x09], 0x0100);
    cpu.regs.set_hl(0x0FFF);
    cpu.regs.set_bc(0x0001);
    cpu.set_flag(Flag::Z, true);
    cpu.set_flag(Flag::N, true);

    assert_eq!(cpu.step(&mut bus), Ok(2));
    assert_eq!(cpu.regs.hl(), 0x1000);
    assert_eq!(flags(&cpu), (true, false, true, false));
}

#[test]
fn signed_offsets_on_sp() {
    // LD HL,SP+1 ; ADD SP,-1
    let (mut cpu, mut bus) = setup(&[0xF8, 0x01, 0xE8, 0xFF], 0x0100);
    cpu.regs.sp = 0x00FF;
    cpu.set_flag(Flag::Z, true);

    assert_eq!(cpu.step(&mut bus), Ok(3));
    assert_eq!(cpu.regs.hl(), 0x0100);
    assert_eq!(flags(&cpu), (false, false, true, true));

    cpu.regs.sp = 0x0000;
    assert_eq!(cpu.step(&mut bus), Ok(4));
    assert_eq!(cpu.regs.sp, 0xFFFF);
    assert_eq!(flags(&cpu), (false, false, false, false));
}

#[test]
fn daa_corrects_after_add_and_sub() {
    // ADD A,0x27 ; DAA ; SUB 0x15 ; DAA
    let (mut cpu, mut bus) = setup(&[0xC6, 0x27, 0x27, 0xD6, 0x15, 0x27], 0x0100);
    cpu.regs.a = 0x15;

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a, 0x3C);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a, 0x42);
    assert!(!cpu.get_flag(Flag::C));

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a, 0x2D);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a, 0x27);
    assert_eq!(flags(&cpu), (false, true, false, false));
}

#[test]
fn jr_wraps_around_the_address_space() {
    let (mut cpu, mut bus) = setup(&[0x18, 0xFE], 0x0000);
    assert_eq!(cpu.step(&mut bus), Ok(3));
    assert_eq!(cpu.regs.pc, 0x0000);

    let (mut cpu, mut bus) = setup(&[0x18, 0x05], 0xFFFE);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.pc, 0x0005);
}

#[test]
fn conditional_branches_charge_taken_cost() {
    // JR NZ,+5
    let (mut cpu, mut bus) = setup(&[0x20, 0x05], 0x0100);
    cpu.set_flag(Flag::Z, true);
    assert_eq!(cpu.step(&mut bus), Ok(2));
    assert_eq!(cpu.regs.pc, 0x0102);

    cpu.regs.pc = 0x0100;
    cpu.set_flag(Flag::Z, false);
    assert_eq!(cpu.step(&mut bus), Ok(3));
    assert_eq!(cpu.regs.pc, 0x0107);

    // CALL C,a16 not taken leaves the stack alone.
    let (mut cpu, mut bus) = setup(&[0xDC, 0x00, 0x40], 0x0100);
    cpu.regs.sp = 0xD000;
    assert_eq!(cpu.step(&mut bus), Ok(3));
    assert_eq!(cpu.regs.pc, 0x0103);
    assert_eq!(cpu.regs.sp, 0xD000);

    // JP Z,a16 taken.
    let (mut cpu, mut bus) = setup(&[0xCA, 0x00, 0x40], 0x0100);
    cpu.set_flag(Flag::Z, true);
    assert_eq!(cpu.step(&mut bus), Ok(4));
    assert_eq!(cpu.regs.pc, 0x4000);

    // RET NC both ways.
    let (mut cpu, mut bus) = setup(&[0xD0], 0x0100);
    cpu.regs.sp = 0xD000;
    bus.memory[0xD000] = 0x78;
    bus.memory[0xD001] = 0x56;
    cpu.set_flag(Flag::C, true);
    assert_eq!(cpu.step(&mut bus), Ok(2));
    assert_eq!(cpu.regs.pc, 0x0101);

    cpu.regs.pc = 0x0100;
    cpu.set_flag(Flag::C, false);
    assert_eq!(cpu.step(&mut bus), Ok(5));
    assert_eq!(cpu.regs.pc, 0x5678);
    assert_eq!(cpu.regs.sp, 0xD002);
}

#[test]
fn rst_and_jp_hl() {
    let (mut cpu, mut bus) = setup(&[0xEF], 0x0150);
    cpu.regs.sp = 0xD000;
    assert_eq!(cpu.step(&mut bus), Ok(4));
    assert_eq!(cpu.regs.pc, 0x0028);
    assert_eq!(bus.memory[0xCFFE], 0x51);
    assert_eq!(bus.memory[0xCFFF], 0x01);

    let (mut cpu, mut bus) = setup(&[0xE9], 0x0100);
    cpu.regs.set_hl(0x3456);
    assert_eq!(cpu.step(&mut bus), Ok(1));
    assert_eq!(cpu.regs.pc, 0x3456);
}

#[test]
fn push_then_pop_round_trips() {
    let mut rng = StdRng::seed_from_u64(0xB0B);
    for _ in 0..200 {
        let value: u16 = rng.gen();
        let sp: u16 = rng.gen_range(0xC002..=0xDFFF);

        // PUSH BC ; POP DE
        let (mut cpu, mut bus) = setup(&[0xC5, 0xD1], 0x0100);
        cpu.regs.sp = sp;
        cpu.regs.set_bc(value);

        assert_eq!(cpu.step(&mut bus), Ok(4));
        assert_eq!(cpu.regs.sp, sp.wrapping_sub(2));
        assert_eq!(cpu.step(&mut bus), Ok(3));
        assert_eq!(cpu.regs.de(), value);
        assert_eq!(cpu.regs.sp, sp);
    }
}

#[test]
fn pop_af_masks_low_nibble() {
    let (mut cpu, mut bus) = setup(&[0xF1], 0x0100);
    cpu.regs.sp = 0xD000;
    bus.memory[0xD000] = 0xFF;
    bus.memory[0xD001] = 0x12;

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.af(), 0x12F0);
}

#[test]
fn ld_a16_sp_stores_little_endian() {
    let (mut cpu, mut bus) = setup(&[0x08, 0x00, 0xC1], 0x0100);
    cpu.regs.sp = 0xBEEF;
    assert_eq!(cpu.step(&mut bus), Ok(5));
    assert_eq!(bus.memory[0xC100], 0xEF);
    assert_eq!(bus.memory[0xC101], 0xBE);
    assert_eq!(cpu.regs.pc, 0x0103);
}

#[test]
fn hl_increment_and_decrement_loads() {
    // LD (HL+),A ; LD A,(HL-)
    let (mut cpu, mut bus) = setup(&[0x22, 0x3A], 0x0100);
    cpu.regs.set_hl(0xC000);
    cpu.regs.a = 0x99;
    bus.memory[0xC001] = 0x11;

    assert_eq!(cpu.step(&mut bus), Ok(2));
    assert_eq!(bus.memory[0xC000], 0x99);
    assert_eq!(cpu.regs.hl(), 0xC001);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a, 0x11);
    assert_eq!(cpu.regs.hl(), 0xC000);
}

#[test]
fn ly_read_is_spoofed_only_for_ldh() {
    // LDH A,(0x44) ; LD A,(0xFF44) ; LD A,(C)
    let program = [0xF0, 0x44, 0xFA, 0x44, 0xFF, 0xF2];
    let (mut cpu, mut bus) = setup(&program, 0x0100);
    bus.memory[LY_ADDR as usize] = 0x33;
    cpu.regs.c = 0x44;

    assert_eq!(cpu.step(&mut bus), Ok(3));
    assert_eq!(cpu.regs.a, LY_SPOOF_VALUE);
    assert_eq!(cpu.step(&mut bus), Ok(4));
    assert_eq!(cpu.regs.a, 0x33);
    cpu.regs.a = 0;
    assert_eq!(cpu.step(&mut bus), Ok(2));
    assert_eq!(cpu.regs.a, 0x33);

    let config = CpuConfig::builder().spoof_ly(false).build();
    let (mut cpu, mut bus) = setup_with(config, &program, 0x0100);
    bus.memory[LY_ADDR as usize] = 0x33;
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a, 0x33);
}

#[test]
fn boot_overlay_restores_cartridge_before_the_io_write() {
    let cartridge: Vec<u8> = (0..=0xFFu8).collect();
    let mut cpu = Cpu::new();
    let mut bus = RecordingBus::default();
    bus.inner.memory[..BOOT_OVERLAY_LEN].fill(0xEE);
    // LDH (0x50),A twice
    bus.inner.memory[0x0200..0x0204].copy_from_slice(&[0xE0, 0x50, 0xE0, 0x50]);
    cpu.regs.pc = 0x0200;
    cpu.regs.a = 0x01;
    cpu.arm_boot_overlay(&cartridge);
    assert!(cpu.boot_overlay_active());

    assert_eq!(cpu.step(&mut bus), Ok(3));
    assert!(!cpu.boot_overlay_active());
    assert_eq!(&bus.inner.memory[..BOOT_OVERLAY_LEN], &cartridge[..]);
    assert_eq!(bus.writes.len(), BOOT_OVERLAY_LEN + 1);
    assert_eq!(bus.writes.last(), Some(&(BOOT_OFF_ADDR, 0x01)));

    // A second write does not restore again.
    bus.inner.memory[0] = 0xEE;
    bus.writes.clear();
    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.inner.memory[0], 0xEE);
    assert_eq!(bus.writes, vec![(BOOT_OFF_ADDR, 0x01)]);
}

#[test]
fn one_byte_stop_executes_the_padding_byte() {
    let config = CpuConfig::builder().stop_length(StopLength::OneByte).build();
    // STOP ; INC A
    let (mut cpu, mut bus) = setup_with(config, &[0x10, 0x3C], 0x0100);
    cpu.regs.a = 0x01;

    assert_eq!(cpu.step(&mut bus), Ok(1));
    assert!(cpu.halted);
    assert_eq!(cpu.regs.pc, 0x0101);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a, 0x02);
    assert_eq!(cpu.regs.pc, 0x0102);
}

#[test]
fn ld_c_a_to_ff50_leaves_the_boot_overlay_mapped() {
    let cartridge = [0x11u8; BOOT_OVERLAY_LEN];
    let (mut cpu, mut bus) = setup(&[0xE2], 0x0200);
    bus.memory[..BOOT_OVERLAY_LEN].fill(0xEE);
    cpu.regs.a = 0x01;
    cpu.regs.c = 0x50;
    cpu.arm_boot_overlay(&cartridge);

    assert_eq!(cpu.step(&mut bus), Ok(2));
    assert!(cpu.boot_overlay_active());
    assert_eq!(bus.memory[0x0000], 0xEE);
    assert_eq!(bus.memory[BOOT_OFF_ADDR as usize], 0x01);
}

#[test]
fn halt_and_stop_only_set_the_flag() {
    // HALT ; STOP 0 ; NOP
    let (mut cpu, mut bus) = setup(&[0x76, 0x10, 0x00, 0x00], 0x0100);
    assert_eq!(cpu.step(&mut bus), Ok(1));
    assert!(cpu.halted);
    assert_eq!(cpu.regs.pc, 0x0101);

    // The engine keeps executing when asked to.
    cpu.halted = false;
    assert_eq!(cpu.step(&mut bus), Ok(1));
    assert!(cpu.halted);
    assert_eq!(cpu.regs.pc, 0x0103);
}

#[test]
fn ei_di_and_reti_drive_ime() {
    // EI ; DI ; RETI
    let (mut cpu, mut bus) = setup(&[0xFB, 0xF3, 0xD9], 0x0100);
    cpu.regs.sp = 0xD000;
    bus.memory[0xD000] = 0x00;
    bus.memory[0xD001] = 0x20;

    cpu.step(&mut bus).unwrap();
    assert!(cpu.ime);
    cpu.step(&mut bus).unwrap();
    assert!(!cpu.ime);
    assert_eq!(cpu.step(&mut bus), Ok(4));
    assert!(cpu.ime);
    assert_eq!(cpu.regs.pc, 0x2000);
}

fn is_control_transfer(instruction: Instruction) -> bool {
    use Instruction::*;
    matches!(
        instruction,
        Jr | JrIf(_)
            | Jp
            | JpIf(_)
            | JpHl
            | Call
            | CallIf(_)
            | Ret
            | RetIf(_)
            | Reti
            | Rst(_)
    )
}

#[test]
fn straight_line_instructions_advance_pc_by_length() {
    for prefixed in [false, true] {
        for opcode in 0..=0xFFu8 {
            let Ok(instruction) = decode(opcode, prefixed) else {
                continue;
            };
            if is_control_transfer(instruction) {
                continue;
            }
            let program = if prefixed {
                vec![PREFIX_BYTE, opcode]
            } else {
                vec![opcode, 0x00, 0x00]
            };
            let (mut cpu, mut bus) = setup(&program, 0xC000);
            cpu.regs.sp = 0xD000;
            cpu.regs.set_hl(0xC800);

            let cycles = cpu.step(&mut bus).unwrap();
            assert_eq!(
                cpu.regs.pc,
                0xC000 + instruction.length(),
                "{}",
                instruction.diagnostic_name()
            );
            assert_eq!(
                cycles,
                instruction.timing().base as u32,
                "{}",
                instruction.diagnostic_name()
            );
        }
    }
}

#[test]
fn undefined_opcode_is_fatal_and_leaves_state_untouched() {
    let (mut cpu, mut bus) = setup(&[0xDD], 0x0150);
    let before = cpu.regs;

    assert_eq!(
        cpu.step(&mut bus),
        Err(CpuError::Decode {
            source: DecodeError {
                opcode: 0xDD,
                prefixed: false
            },
            pc: 0x0150,
        })
    );
    assert_eq!(cpu.regs, before);
}

#[test]
fn reduced_prefixed_coverage_rejects_other_cb_ops() {
    let config = CpuConfig::builder()
        .prefixed(PrefixedCoverage::BitAndRotateOnly)
        .build();
    // BIT 7,H ; RL C ; SWAP A
    let (mut cpu, mut bus) = setup_with(config, &[0xCB, 0x7C, 0xCB, 0x11, 0xCB, 0x37], 0x0100);

    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();
    let before = cpu.regs;
    let err = cpu.step(&mut bus).unwrap_err();
    assert_eq!(
        err,
        CpuError::Unimplemented {
            instruction: "0xCB37__SWAP A".to_string(),
            pc: 0x0104,
        }
    );
    assert_eq!(cpu.regs, before);
}

#[test]
fn interrupts_dispatch_in_priority_order() {
    let mut cpu = Cpu::new();
    let mut bus = TestBus::default();
    bus.memory[IE_ADDR as usize] = 0x1F;
    bus.memory[IF_ADDR as usize] = 0x1F;
    cpu.regs.pc = 0x1234;
    cpu.regs.sp = 0xD000;
    cpu.ime = true;
    cpu.halted = true;

    assert_eq!(cpu.service_interrupt(&mut bus), Some(INTERRUPT_DISPATCH_CYCLES));
    assert_eq!(cpu.regs.pc, 0x0040);
    assert_eq!(bus.memory[IF_ADDR as usize], 0x1E);
    assert!(!cpu.ime);
    assert!(!cpu.halted);
    assert_eq!(bus.memory[0xCFFF], 0x12);
    assert_eq!(bus.memory[0xCFFE], 0x34);

    // IME clear: nothing happens.
    assert_eq!(cpu.service_interrupt(&mut bus), None);
    assert_eq!(cpu.regs.pc, 0x0040);

    cpu.ime = true;
    cpu.service_interrupt(&mut bus).unwrap();
    assert_eq!(cpu.regs.pc, 0x0048);
    assert_eq!(bus.memory[IF_ADDR as usize], 0x1C);
}

#[test]
fn disabled_sources_are_not_dispatched() {
    let mut cpu = Cpu::new();
    let mut bus = TestBus::default();
    bus.memory[IE_ADDR as usize] = Interrupts::JOYPAD.bits();
    bus.memory[IF_ADDR as usize] = (Interrupts::TIMER | Interrupts::JOYPAD).bits();
    cpu.ime = true;

    cpu.service_interrupt(&mut bus).unwrap();
    assert_eq!(cpu.regs.pc, 0x0060);
    assert_eq!(bus.memory[IF_ADDR as usize], Interrupts::TIMER.bits());
}

#[test]
fn halted_cpu_wakes_on_pending_interrupt_without_ime() {
    let mut cpu = Cpu::new();
    let mut bus = TestBus::default();
    cpu.halted = true;
    assert!(!cpu.wake_if_pending(&mut bus));

    bus.memory[IE_ADDR as usize] = Interrupts::SERIAL.bits();
    bus.memory[IF_ADDR as usize] = Interrupts::SERIAL.bits();
    assert!(cpu.wake_if_pending(&mut bus));
    assert!(!cpu.halted);
    assert_eq!(cpu.service_interrupt(&mut bus), None);
}

#[test]
fn interrupt_vectors() {
    assert_eq!(Interrupts::VBLANK.vector(), 0x40);
    assert_eq!(Interrupts::LCD_STAT.vector(), 0x48);
    assert_eq!(Interrupts::TIMER.vector(), 0x50);
    assert_eq!(Interrupts::SERIAL.vector(), 0x58);
    assert_eq!(Interrupts::JOYPAD.vector(), 0x60);
    assert_eq!(
        (Interrupts::SERIAL | Interrupts::LCD_STAT).highest(),
        Some(Interrupts::LCD_STAT)
    );
    assert_eq!(Interrupts::empty().highest(), None);
}
