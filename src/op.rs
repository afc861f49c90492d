use std::convert::TryFrom;

/// The 35 CHIP-8 op codes, minus 0NNN (call into RCA 1802 machine code) which no
/// interpreter on modern hardware can run. Register operands are guaranteed to be between
/// 0x0 and 0xF, addresses between 0x000 and 0xFFF
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Op {
    // 0XXX
    // 00E0 	Display 	disp_clear() 	Clears the screen.
    DispClear,
    // 00EE 	Flow 	return; 	Returns from a subroutine.
    Return,

    // 1NNN 	Flow 	goto NNN;
    Goto(u16),

    // 2NNN 	Flow 	*(0xNNN)()
    GotoSubRtn(u16),

    // 3XNN 	Cond 	if(Vx==NN) skip
    CondVxEq(u8, u8),

    // 4XNN 	Cond 	if(Vx!=NN) skip
    CondVxNe(u8, u8),

    // 5XY0 	Cond 	if(Vx==Vy) skip
    CondVxVyEq(u8, u8),

    // 6XNN 	Const 	Vx = NN
    ConstSetVx(u8, u8),

    // 7XNN 	Const 	Vx += NN, no carry
    ConstAddVx(u8, u8),

    // 8XYN
    AssignVyToVx(u8, u8),
    BitOpOr(u8, u8),
    BitOpAnd(u8, u8),
    BitOpXor(u8, u8),
    MathVxAddVy(u8, u8),
    MathVxMinusVy(u8, u8),
    BitOpRtShift(u8, u8),
    MathVyMinusVx(u8, u8),
    BitOpLftShift(u8, u8),

    // 9XY0 	Cond 	if(Vx!=Vy) skip
    CondVxVyNe(u8, u8),

    // ANNN 	MEM 	I = NNN
    MemSetI(u16),

    // BNNN 	Flow 	PC = V0 + NNN
    GotoPlusV0(u16),

    // CXNN 	Rand 	Vx = rand() & NN
    Rand(u8, u8),

    // DXYN 	Disp 	draw(Vx, Vy, N)
    DispDraw(u8, u8, u8),

    // EX9E / EXA1
    KeyOpEqVx(u8),
    KeyOpNeVx(u8),

    // FXNN
    DelayGet(u8),
    KeyOpGet(u8),
    DelaySet(u8),
    SoundSet(u8),
    MemIPlusEqVx(u8),
    MemISetSprite(u8),
    Bcd(u8),
    RegDump(u8),
    RegLoad(u8),
}

impl Op {
    /// True for the ops that change the display, so a host only has to redraw after these
    pub fn is_display_op(&self) -> bool {
        matches!(self, Op::DispClear | Op::DispDraw(..))
    }
}

/// Turn three nibbles, most significant first, into a 12 bit address
pub fn three_nibbles_to_address(n1: u8, n2: u8, n3: u8) -> u16 {
    ((n1 as u16) << 8) | ((n2 as u16) << 4) | n3 as u16
}

impl TryFrom<u16> for Op {
    /// the instruction word that didn't decode
    type Error = u16;

    fn try_from(item: u16) -> Result<Self, Self::Error> {
        let mask = 0xF;

        // these are the 4 nibbles of item, where nibb_1 is the MSB and nibb_4 is the LSB
        let nibb_1 = ((item >> 12) & mask) as u8;
        let nibb_2 = ((item >> 8) & mask) as u8;
        let nibb_3 = ((item >> 4) & mask) as u8;
        let nibb_4 = (item & mask) as u8;

        let addr = item & 0x0FFF;
        let byte = (item & 0x00FF) as u8;

        let op = match [nibb_1, nibb_2, nibb_3, nibb_4] {
            [0x0, 0x0, 0xE, 0x0] => Op::DispClear,
            [0x0, 0x0, 0xE, 0xE] => Op::Return,
            [0x1, _, _, _] => Op::Goto(addr),
            [0x2, _, _, _] => Op::GotoSubRtn(addr),
            [0x3, x, _, _] => Op::CondVxEq(x, byte),
            [0x4, x, _, _] => Op::CondVxNe(x, byte),
            [0x5, x, y, 0x0] => Op::CondVxVyEq(x, y),
            [0x6, x, _, _] => Op::ConstSetVx(x, byte),
            [0x7, x, _, _] => Op::ConstAddVx(x, byte),
            [0x8, x, y, n] => match n {
                0x0 => Op::AssignVyToVx(x, y),
                0x1 => Op::BitOpOr(x, y),
                0x2 => Op::BitOpAnd(x, y),
                0x3 => Op::BitOpXor(x, y),
                0x4 => Op::MathVxAddVy(x, y),
                0x5 => Op::MathVxMinusVy(x, y),
                0x6 => Op::BitOpRtShift(x, y),
                0x7 => Op::MathVyMinusVx(x, y),
                0xE => Op::BitOpLftShift(x, y),
                _ => return Err(item),
            },
            [0x9, x, y, 0x0] => Op::CondVxVyNe(x, y),
            [0xA, _, _, _] => Op::MemSetI(addr),
            [0xB, _, _, _] => Op::GotoPlusV0(addr),
            [0xC, x, _, _] => Op::Rand(x, byte),
            [0xD, x, y, n] => Op::DispDraw(x, y, n),
            [0xE, x, 0x9, 0xE] => Op::KeyOpEqVx(x),
            [0xE, x, 0xA, 0x1] => Op::KeyOpNeVx(x),
            [0xF, x, n3, n4] => match [n3, n4] {
                [0x0, 0x7] => Op::DelayGet(x),
                [0x0, 0xA] => Op::KeyOpGet(x),
                [0x1, 0x5] => Op::DelaySet(x),
                [0x1, 0x8] => Op::SoundSet(x),
                [0x1, 0xE] => Op::MemIPlusEqVx(x),
                [0x2, 0x9] => Op::MemISetSprite(x),
                [0x3, 0x3] => Op::Bcd(x),
                [0x5, 0x5] => Op::RegDump(x),
                [0x6, 0x5] => Op::RegLoad(x),
                _ => return Err(item),
            },
            _ => return Err(item),
        };

        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(word: u16) -> Op {
        Op::try_from(word).unwrap()
    }

    #[test]
    fn convert_opcodes() {
        assert_eq!(decode(0x00E0), Op::DispClear);
        assert_eq!(decode(0x00EE), Op::Return);
        assert_eq!(decode(0x1000), Op::Goto(0x000));
        assert_eq!(decode(0x2AAA), Op::GotoSubRtn(0xAAA));
        assert_eq!(decode(0x3FAA), Op::CondVxEq(0xF, 0xAA));
        assert_eq!(decode(0x4FAA), Op::CondVxNe(0xF, 0xAA));
        assert_eq!(decode(0x5FA0), Op::CondVxVyEq(0xF, 0xA));
        assert_eq!(decode(0x6FAB), Op::ConstSetVx(0xF, 0xAB));
        assert_eq!(decode(0x7FAB), Op::ConstAddVx(0xF, 0xAB));
        assert_eq!(decode(0x8FA0), Op::AssignVyToVx(0xF, 0xA));
        assert_eq!(decode(0x8FA1), Op::BitOpOr(0xF, 0xA));
        assert_eq!(decode(0x8FA2), Op::BitOpAnd(0xF, 0xA));
        assert_eq!(decode(0x8FA3), Op::BitOpXor(0xF, 0xA));
        assert_eq!(decode(0x8FA4), Op::MathVxAddVy(0xF, 0xA));
        assert_eq!(decode(0x8FA5), Op::MathVxMinusVy(0xF, 0xA));
        assert_eq!(decode(0x8FA6), Op::BitOpRtShift(0xF, 0xA));
        assert_eq!(decode(0x8FA7), Op::MathVyMinusVx(0xF, 0xA));
        assert_eq!(decode(0x8FAE), Op::BitOpLftShift(0xF, 0xA));
        assert_eq!(decode(0x9FA0), Op::CondVxVyNe(0xF, 0xA));
        assert_eq!(decode(0xAFAB), Op::MemSetI(0xFAB));
        assert_eq!(decode(0xBFAB), Op::GotoPlusV0(0xFAB));
        assert_eq!(decode(0xCFAB), Op::Rand(0xF, 0xAB));
        assert_eq!(decode(0xDFAB), Op::DispDraw(0xF, 0xA, 0xB));
        assert_eq!(decode(0xEF9E), Op::KeyOpEqVx(0xF));
        assert_eq!(decode(0xEFA1), Op::KeyOpNeVx(0xF));
        assert_eq!(decode(0xF907), Op::DelayGet(0x9));
        assert_eq!(decode(0xF90A), Op::KeyOpGet(0x9));
        assert_eq!(decode(0xF915), Op::DelaySet(0x9));
        assert_eq!(decode(0xF918), Op::SoundSet(0x9));
        assert_eq!(decode(0xF91E), Op::MemIPlusEqVx(0x9));
        assert_eq!(decode(0xF929), Op::MemISetSprite(0x9));
        assert_eq!(decode(0xF933), Op::Bcd(0x9));
        assert_eq!(decode(0xF955), Op::RegDump(0x9));
        assert_eq!(decode(0xF965), Op::RegLoad(0x9));
    }

    #[test]
    fn reject_unknown_opcodes() {
        for &word in &[0x0000, 0x0123, 0x00E1, 0x5AB1, 0x8DEF, 0x8AB8, 0x9DEF, 0xED9F, 0xFDEF] {
            assert_eq!(Op::try_from(word), Err(word), "{:#06X} should not decode", word);
        }
    }

    #[test]
    fn display_ops() {
        assert!(Op::DispClear.is_display_op());
        assert!(Op::DispDraw(0, 1, 5).is_display_op());
        assert!(!Op::Return.is_display_op());
        assert!(!Op::MemISetSprite(2).is_display_op());
    }

    #[test]
    fn three_u8s_to_address_test() {
        assert_eq!(three_nibbles_to_address(0x0, 0xF, 0xA), 0x0FA);
        assert_eq!(three_nibbles_to_address(0xF, 0xF, 0xF), 0xFFF);
    }
}
