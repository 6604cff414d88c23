//! The CIL opcode table: mnemonic and operand kind per opcode.
//!
//! The instruction set splits into a single-byte space (0x00-0xFF) and an
//! extended space reached through the 0xFE prefix byte, where the second
//! byte selects the entry. Reserved encodings carry an empty mnemonic and
//! decoding one is an error.
//!
//! # Reference
//! - ECMA-335 6th Edition, Partition III - CIL Instruction Set

/// The first byte of every extended-space opcode.
pub const TWO_BYTE_PREFIX: u8 = 0xFE;

/// The kind of operand an opcode carries, determining how many bytes follow
/// the opcode and how they render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// No operand bytes.
    None,
    /// 4-byte signed branch target, relative to the next instruction.
    BrTarget,
    /// 1-byte signed branch target, relative to the next instruction.
    ShortBrTarget,
    /// 4-byte field token, resolved to a member signature string.
    Field,
    /// 4-byte method token, resolved to a member signature string.
    Method,
    /// 4-byte token resolved polymorphically by its table kind.
    Token,
    /// 4-byte type token, resolved to a type name.
    Type,
    /// 4-byte standalone signature token, rendered unresolved.
    Signature,
    /// 4-byte signed integer, decimal.
    I32,
    /// 1-byte signed integer, rendered as a zero-padded hex byte.
    ShortI,
    /// 8-byte signed integer, hex.
    I64,
    /// 8-byte IEEE-754 double.
    R64,
    /// 4-byte IEEE-754 single, widened to double for rendering.
    ShortR,
    /// 2-byte signed variable index, rendered as `variable-%d`.
    Var,
    /// 1-byte signed variable index, plain decimal.
    ShortVar,
    /// 4-byte user-string token, low 24 bits index the `#US` heap.
    String,
    /// 4-byte case count followed by that many 4-byte relative targets.
    Switch,
}

/// One opcode table entry. Reserved encodings have an empty mnemonic.
#[derive(Debug, Clone, Copy)]
pub struct OpCode {
    /// The textual mnemonic, e.g. `ldc.i4.s`.
    pub mnemonic: &'static str,
    /// The operand kind following the opcode byte(s).
    pub operand: OperandKind,
}

const fn op(mnemonic: &'static str, operand: OperandKind) -> OpCode {
    OpCode { mnemonic, operand }
}

const RESERVED: OpCode = op("", OperandKind::None);

use OperandKind as K;

/// Single-byte opcode space, indexed by the opcode byte.
#[rustfmt::skip]
pub static OPCODES: [OpCode; 256] = [
    /* 0x00 */ op("nop", K::None),
    /* 0x01 */ op("break", K::None),
    /* 0x02 */ op("ldarg.0", K::None),
    /* 0x03 */ op("ldarg.1", K::None),
    /* 0x04 */ op("ldarg.2", K::None),
    /* 0x05 */ op("ldarg.3", K::None),
    /* 0x06 */ op("ldloc.0", K::None),
    /* 0x07 */ op("ldloc.1", K::None),
    /* 0x08 */ op("ldloc.2", K::None),
    /* 0x09 */ op("ldloc.3", K::None),
    /* 0x0A */ op("stloc.0", K::None),
    /* 0x0B */ op("stloc.1", K::None),
    /* 0x0C */ op("stloc.2", K::None),
    /* 0x0D */ op("stloc.3", K::None),
    /* 0x0E */ op("ldarg.s", K::ShortVar),
    /* 0x0F */ op("ldarga.s", K::ShortVar),
    /* 0x10 */ op("starg.s", K::ShortVar),
    /* 0x11 */ op("ldloc.s", K::ShortVar),
    /* 0x12 */ op("ldloca.s", K::ShortVar),
    /* 0x13 */ op("stloc.s", K::ShortVar),
    /* 0x14 */ op("ldnull", K::None),
    /* 0x15 */ op("ldc.i4.m1", K::None),
    /* 0x16 */ op("ldc.i4.0", K::None),
    /* 0x17 */ op("ldc.i4.1", K::None),
    /* 0x18 */ op("ldc.i4.2", K::None),
    /* 0x19 */ op("ldc.i4.3", K::None),
    /* 0x1A */ op("ldc.i4.4", K::None),
    /* 0x1B */ op("ldc.i4.5", K::None),
    /* 0x1C */ op("ldc.i4.6", K::None),
    /* 0x1D */ op("ldc.i4.7", K::None),
    /* 0x1E */ op("ldc.i4.8", K::None),
    /* 0x1F */ op("ldc.i4.s", K::ShortI),
    /* 0x20 */ op("ldc.i4", K::I32),
    /* 0x21 */ op("ldc.i8", K::I64),
    /* 0x22 */ op("ldc.r4", K::ShortR),
    /* 0x23 */ op("ldc.r8", K::R64),
    /* 0x24 */ RESERVED,
    /* 0x25 */ op("dup", K::None),
    /* 0x26 */ op("pop", K::None),
    /* 0x27 */ op("jmp", K::Method),
    /* 0x28 */ op("call", K::Method),
    /* 0x29 */ op("calli", K::Signature),
    /* 0x2A */ op("ret", K::None),
    /* 0x2B */ op("br.s", K::ShortBrTarget),
    /* 0x2C */ op("brfalse.s", K::ShortBrTarget),
    /* 0x2D */ op("brtrue.s", K::ShortBrTarget),
    /* 0x2E */ op("beq.s", K::ShortBrTarget),
    /* 0x2F */ op("bge.s", K::ShortBrTarget),
    /* 0x30 */ op("bgt.s", K::ShortBrTarget),
    /* 0x31 */ op("ble.s", K::ShortBrTarget),
    /* 0x32 */ op("blt.s", K::ShortBrTarget),
    /* 0x33 */ op("bne.un.s", K::ShortBrTarget),
    /* 0x34 */ op("bge.un.s", K::ShortBrTarget),
    /* 0x35 */ op("bgt.un.s", K::ShortBrTarget),
    /* 0x36 */ op("ble.un.s", K::ShortBrTarget),
    /* 0x37 */ op("blt.un.s", K::ShortBrTarget),
    /* 0x38 */ op("br", K::BrTarget),
    /* 0x39 */ op("brfalse", K::BrTarget),
    /* 0x3A */ op("brtrue", K::BrTarget),
    /* 0x3B */ op("beq", K::BrTarget),
    /* 0x3C */ op("bge", K::BrTarget),
    /* 0x3D */ op("bgt", K::BrTarget),
    /* 0x3E */ op("ble", K::BrTarget),
    /* 0x3F */ op("blt", K::BrTarget),
    /* 0x40 */ op("bne.un", K::BrTarget),
    /* 0x41 */ op("bge.un", K::BrTarget),
    /* 0x42 */ op("bgt.un", K::BrTarget),
    /* 0x43 */ op("ble.un", K::BrTarget),
    /* 0x44 */ op("blt.un", K::BrTarget),
    /* 0x45 */ op("switch", K::Switch),
    /* 0x46 */ op("ldind.i1", K::None),
    /* 0x47 */ op("ldind.u1", K::None),
    /* 0x48 */ op("ldind.i2", K::None),
    /* 0x49 */ op("ldind.u2", K::None),
    /* 0x4A */ op("ldind.i4", K::None),
    /* 0x4B */ op("ldind.u4", K::None),
    /* 0x4C */ op("ldind.i8", K::None),
    /* 0x4D */ op("ldind.i", K::None),
    /* 0x4E */ op("ldind.r4", K::None),
    /* 0x4F */ op("ldind.r8", K::None),
    /* 0x50 */ op("ldind.ref", K::None),
    /* 0x51 */ op("stind.ref", K::None),
    /* 0x52 */ op("stind.i1", K::None),
    /* 0x53 */ op("stind.i2", K::None),
    /* 0x54 */ op("stind.i4", K::None),
    /* 0x55 */ op("stind.i8", K::None),
    /* 0x56 */ op("stind.r4", K::None),
    /* 0x57 */ op("stind.r8", K::None),
    /* 0x58 */ op("add", K::None),
    /* 0x59 */ op("sub", K::None),
    /* 0x5A */ op("mul", K::None),
    /* 0x5B */ op("div", K::None),
    /* 0x5C */ op("div.un", K::None),
    /* 0x5D */ op("rem", K::None),
    /* 0x5E */ op("rem.un", K::None),
    /* 0x5F */ op("and", K::None),
    /* 0x60 */ op("or", K::None),
    /* 0x61 */ op("xor", K::None),
    /* 0x62 */ op("shl", K::None),
    /* 0x63 */ op("shr", K::None),
    /* 0x64 */ op("shr.un", K::None),
    /* 0x65 */ op("neg", K::None),
    /* 0x66 */ op("not", K::None),
    /* 0x67 */ op("conv.i1", K::None),
    /* 0x68 */ op("conv.i2", K::None),
    /* 0x69 */ op("conv.i4", K::None),
    /* 0x6A */ op("conv.i8", K::None),
    /* 0x6B */ op("conv.r4", K::None),
    /* 0x6C */ op("conv.r8", K::None),
    /* 0x6D */ op("conv.u4", K::None),
    /* 0x6E */ op("conv.u8", K::None),
    /* 0x6F */ op("callvirt", K::Method),
    /* 0x70 */ op("cpobj", K::Type),
    /* 0x71 */ op("ldobj", K::Type),
    /* 0x72 */ op("ldstr", K::String),
    /* 0x73 */ op("newobj", K::Method),
    /* 0x74 */ op("castclass", K::Type),
    /* 0x75 */ op("isinst", K::Type),
    /* 0x76 */ op("conv.r.un", K::None),
    /* 0x77 */ RESERVED,
    /* 0x78 */ RESERVED,
    /* 0x79 */ op("unbox", K::Type),
    /* 0x7A */ op("throw", K::None),
    /* 0x7B */ op("ldfld", K::Field),
    /* 0x7C */ op("ldflda", K::Field),
    /* 0x7D */ op("stfld", K::Field),
    /* 0x7E */ op("ldsfld", K::Field),
    /* 0x7F */ op("ldsflda", K::Field),
    /* 0x80 */ op("stsfld", K::Field),
    /* 0x81 */ op("stobj", K::Type),
    /* 0x82 */ op("conv.ovf.i1.un", K::None),
    /* 0x83 */ op("conv.ovf.i2.un", K::None),
    /* 0x84 */ op("conv.ovf.i4.un", K::None),
    /* 0x85 */ op("conv.ovf.i8.un", K::None),
    /* 0x86 */ op("conv.ovf.u1.un", K::None),
    /* 0x87 */ op("conv.ovf.u2.un", K::None),
    /* 0x88 */ op("conv.ovf.u4.un", K::None),
    /* 0x89 */ op("conv.ovf.u8.un", K::None),
    /* 0x8A */ op("conv.ovf.i.un", K::None),
    /* 0x8B */ op("conv.ovf.u.un", K::None),
    /* 0x8C */ op("box", K::Type),
    /* 0x8D */ op("newarr", K::Type),
    /* 0x8E */ op("ldlen", K::None),
    /* 0x8F */ op("ldelema", K::Type),
    /* 0x90 */ op("ldelem.i1", K::None),
    /* 0x91 */ op("ldelem.u1", K::None),
    /* 0x92 */ op("ldelem.i2", K::None),
    /* 0x93 */ op("ldelem.u2", K::None),
    /* 0x94 */ op("ldelem.i4", K::None),
    /* 0x95 */ op("ldelem.u4", K::None),
    /* 0x96 */ op("ldelem.i8", K::None),
    /* 0x97 */ op("ldelem.i", K::None),
    /* 0x98 */ op("ldelem.r4", K::None),
    /* 0x99 */ op("ldelem.r8", K::None),
    /* 0x9A */ op("ldelem.ref", K::None),
    /* 0x9B */ op("stelem.i", K::None),
    /* 0x9C */ op("stelem.i1", K::None),
    /* 0x9D */ op("stelem.i2", K::None),
    /* 0x9E */ op("stelem.i4", K::None),
    /* 0x9F */ op("stelem.i8", K::None),
    /* 0xA0 */ op("stelem.r4", K::None),
    /* 0xA1 */ op("stelem.r8", K::None),
    /* 0xA2 */ op("stelem.ref", K::None),
    /* 0xA3 */ op("ldelem", K::Type),
    /* 0xA4 */ op("stelem", K::Type),
    /* 0xA5 */ op("unbox.any", K::Type),
    /* 0xA6 */ RESERVED,
    /* 0xA7 */ RESERVED,
    /* 0xA8 */ RESERVED,
    /* 0xA9 */ RESERVED,
    /* 0xAA */ RESERVED,
    /* 0xAB */ RESERVED,
    /* 0xAC */ RESERVED,
    /* 0xAD */ RESERVED,
    /* 0xAE */ RESERVED,
    /* 0xAF */ RESERVED,
    /* 0xB0 */ RESERVED,
    /* 0xB1 */ RESERVED,
    /* 0xB2 */ RESERVED,
    /* 0xB3 */ op("conv.ovf.i1", K::None),
    /* 0xB4 */ op("conv.ovf.u1", K::None),
    /* 0xB5 */ op("conv.ovf.i2", K::None),
    /* 0xB6 */ op("conv.ovf.u2", K::None),
    /* 0xB7 */ op("conv.ovf.i4", K::None),
    /* 0xB8 */ op("conv.ovf.u4", K::None),
    /* 0xB9 */ op("conv.ovf.i8", K::None),
    /* 0xBA */ op("conv.ovf.u8", K::None),
    /* 0xBB */ RESERVED,
    /* 0xBC */ RESERVED,
    /* 0xBD */ RESERVED,
    /* 0xBE */ RESERVED,
    /* 0xBF */ RESERVED,
    /* 0xC0 */ RESERVED,
    /* 0xC1 */ RESERVED,
    /* 0xC2 */ op("refanyval", K::Type),
    /* 0xC3 */ op("ckfinite", K::None),
    /* 0xC4 */ RESERVED,
    /* 0xC5 */ RESERVED,
    /* 0xC6 */ op("mkrefany", K::Type),
    /* 0xC7 */ RESERVED,
    /* 0xC8 */ RESERVED,
    /* 0xC9 */ RESERVED,
    /* 0xCA */ RESERVED,
    /* 0xCB */ RESERVED,
    /* 0xCC */ RESERVED,
    /* 0xCD */ RESERVED,
    /* 0xCE */ RESERVED,
    /* 0xCF */ RESERVED,
    /* 0xD0 */ op("ldtoken", K::Token),
    /* 0xD1 */ op("conv.u2", K::None),
    /* 0xD2 */ op("conv.u1", K::None),
    /* 0xD3 */ op("conv.i", K::None),
    /* 0xD4 */ op("conv.ovf.i", K::None),
    /* 0xD5 */ op("conv.ovf.u", K::None),
    /* 0xD6 */ op("add.ovf", K::None),
    /* 0xD7 */ op("add.ovf.un", K::None),
    /* 0xD8 */ op("mul.ovf", K::None),
    /* 0xD9 */ op("mul.ovf.un", K::None),
    /* 0xDA */ op("sub.ovf", K::None),
    /* 0xDB */ op("sub.ovf.un", K::None),
    /* 0xDC */ op("endfinally", K::None),
    /* 0xDD */ op("leave", K::BrTarget),
    /* 0xDE */ op("leave.s", K::ShortBrTarget),
    /* 0xDF */ op("stind.i", K::None),
    /* 0xE0 */ op("conv.u", K::None),
    /* 0xE1 */ RESERVED,
    /* 0xE2 */ RESERVED,
    /* 0xE3 */ RESERVED,
    /* 0xE4 */ RESERVED,
    /* 0xE5 */ RESERVED,
    /* 0xE6 */ RESERVED,
    /* 0xE7 */ RESERVED,
    /* 0xE8 */ RESERVED,
    /* 0xE9 */ RESERVED,
    /* 0xEA */ RESERVED,
    /* 0xEB */ RESERVED,
    /* 0xEC */ RESERVED,
    /* 0xED */ RESERVED,
    /* 0xEE */ RESERVED,
    /* 0xEF */ RESERVED,
    /* 0xF0 */ RESERVED,
    /* 0xF1 */ RESERVED,
    /* 0xF2 */ RESERVED,
    /* 0xF3 */ RESERVED,
    /* 0xF4 */ RESERVED,
    /* 0xF5 */ RESERVED,
    /* 0xF6 */ RESERVED,
    /* 0xF7 */ RESERVED,
    /* 0xF8 */ RESERVED,
    /* 0xF9 */ RESERVED,
    /* 0xFA */ RESERVED,
    /* 0xFB */ RESERVED,
    /* 0xFC */ RESERVED,
    /* 0xFD */ RESERVED,
    /* 0xFE */ RESERVED, // two-byte prefix, never decoded through this table
    /* 0xFF */ RESERVED,
];

/// Extended opcode space, indexed by the byte following the 0xFE prefix.
#[rustfmt::skip]
pub static OPCODES_FE: [OpCode; 31] = [
    /* 0x00 */ op("arglist", K::None),
    /* 0x01 */ op("ceq", K::None),
    /* 0x02 */ op("cgt", K::None),
    /* 0x03 */ op("cgt.un", K::None),
    /* 0x04 */ op("clt", K::None),
    /* 0x05 */ op("clt.un", K::None),
    /* 0x06 */ op("ldftn", K::Method),
    /* 0x07 */ op("ldvirtftn", K::Method),
    /* 0x08 */ RESERVED,
    /* 0x09 */ op("ldarg", K::Var),
    /* 0x0A */ op("ldarga", K::Var),
    /* 0x0B */ op("starg", K::Var),
    /* 0x0C */ op("ldloc", K::Var),
    /* 0x0D */ op("ldloca", K::Var),
    /* 0x0E */ op("stloc", K::Var),
    /* 0x0F */ op("localloc", K::None),
    /* 0x10 */ RESERVED,
    /* 0x11 */ op("endfilter", K::None),
    /* 0x12 */ op("unaligned.", K::ShortI),
    /* 0x13 */ op("volatile.", K::None),
    /* 0x14 */ op("tail.", K::None),
    /* 0x15 */ op("initobj", K::Type),
    /* 0x16 */ op("constrained.", K::Type),
    /* 0x17 */ op("cpblk", K::None),
    /* 0x18 */ op("initblk", K::None),
    /* 0x19 */ op("no.", K::ShortI),
    /* 0x1A */ op("rethrow", K::None),
    /* 0x1B */ RESERVED,
    /* 0x1C */ op("sizeof", K::Type),
    /* 0x1D */ op("refanytype", K::None),
    /* 0x1E */ op("readonly.", K::None),
];

/// Look up an opcode by its flat id: 0-255 for the single-byte space,
/// `256 + k` for the extended opcode `FE k`.
#[must_use]
pub fn lookup(id: usize) -> Option<&'static OpCode> {
    if id < 256 {
        OPCODES.get(id)
    } else {
        OPCODES_FE.get(id - 256)
    }
}
