pub fn un_xor_shl_and(mut x: u32, n: u32, and: u32) -> u32 {
    for i in 0..=32 - n {
        x ^= (x << n) & and & (1 << (i + n - 1));
    }
    x
}

pub fn un_xor_shr_and(mut x: u32, n: u32, and: u32) -> u32 {
    for i in 0..=32 - n {
        x ^= (x >> n) & and & (1 << 32 - n - i);
    }
    x
}

/// The MT19937 output transform: state word in, generator output out.
pub fn temper(mut y: u32) -> u32 {
    y ^= y >> 11;
    y ^= (y << 7) & 0x9D2C5680;
    y ^= (y << 15) & 0xEFC60000;
    y ^= y >> 18;
    y
}

/// Inverse of [`temper`], undoing each xor-shift step in reverse order.
pub fn untemper(y: u32) -> u32 {
    let y = un_xor_shr_and(y, 18, 0xFFFFFFFF);
    let y = un_xor_shl_and(y, 15, 0xEFC60000);
    let y = un_xor_shl_and(y, 7, 0x9D2C5680);
    un_xor_shr_and(y, 11, 0xFFFFFFFF)
}
