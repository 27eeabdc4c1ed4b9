// Ogg uses the direct (non-reflected) CRC-32 with a zero initial value and no final xor.
const POLY: u32 = 0x04c1_1db7;

const fn table() -> [u32; 256] {
	let mut table = [0u32; 256];
	let mut i = 0;
	while i < 256 {
		let mut r = (i as u32) << 24;
		let mut bit = 0;
		while bit < 8 {
			r = if r & 0x8000_0000 != 0 { (r << 1) ^ POLY } else { r << 1 };
			bit += 1;
		}
		table[i] = r;
		i += 1;
	}
	table
}

static TABLE: [u32; 256] = table();

pub(crate) fn update(crc: u32, data: &[u8]) -> u32 {
	data.iter()
		.fold(crc, |crc, &byte| (crc << 8) ^ TABLE[((crc >> 24) as u8 ^ byte) as usize])
}

#[cfg(test)]
pub(crate) fn checksum(data: &[u8]) -> u32 {
	update(0, data)
}
