//! Number formatting into heapless strings (no `format!` on the target).

use heapless::String;

/// Push a u32 value to a heapless string.
pub fn push_u32<const N: usize>(
    s: &mut String<N>,
    mut val: u32,
) {
    if val == 0 {
        s.push('0').ok();
        return;
    }

    // Build digits in reverse
    let mut digits = [0u8; 10];
    let mut i = 0;
    while val > 0 {
        digits[i] = (val % 10) as u8;
        val /= 10;
        i += 1;
    }

    while i > 0 {
        i -= 1;
        s.push((b'0' + digits[i]) as char).ok();
    }
}

/// Push an i32 value to a heapless string.
pub fn push_i32<const N: usize>(
    s: &mut String<N>,
    val: i32,
) {
    if val < 0 {
        s.push('-').ok();
    }
    push_u32(s, val.unsigned_abs());
}

/// Format a temperature readout, `--` when unknown.
pub fn temperature<const N: usize>(value: Option<i16>) -> String<N> {
    let mut s = String::new();
    match value {
        Some(v) => push_i32(&mut s, i32::from(v)),
        None => {
            s.push_str("--").ok();
        }
    }
    s
}
