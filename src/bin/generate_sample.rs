//! Writes a synthetic observation file in the analyzer's input format: a
//! header of frequency bins followed by one row per acquisition. Odd rows
//! look at the sky (hydrogen line drifting through the beam), even rows at
//! the calibration load.
//!
//! Usage: `generate_sample [OUTPUT]` (default `sample_observation.txt`).

/// Rest frequency of the neutral hydrogen line, MHz.
const HI_LINE_MHZ: f64 = 1420.405_751;
const N_BINS: usize = 256;
const BIN_WIDTH_MHZ: f64 = 0.01;
const N_ROWS: usize = 2000;

/// splitmix64, enough for reproducible noise.
struct Noise(u64);

impl Noise {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Standard normal via Box-Muller.
    fn normal(&mut self) -> f64 {
        let u1 = self.uniform().max(f64::MIN_POSITIVE);
        let u2 = self.uniform();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

/// Received power in dBm for one bin of one sky row.
fn sky_dbm(freq_mhz: f64, row: usize) -> f64 {
    // Source transits the beam halfway through the run.
    let t = row as f64 / N_ROWS as f64;
    let beam = (-((t - 0.5) / 0.15).powi(2)).exp();
    let doppler = 0.08 * (t - 0.5);
    let line = (-((freq_mhz - HI_LINE_MHZ - doppler) / 0.12).powi(2)).exp();
    // Gentle bandpass ripple.
    let ripple = 0.4 * (freq_mhz * 40.0).sin();
    -72.0 + ripple + 6.0 * beam * line
}

/// Header of `N_BINS` frequency labels followed by `rows` acquisitions.
fn observation(rows: usize, noise: &mut Noise) -> String {
    let start = HI_LINE_MHZ - BIN_WIDTH_MHZ * (N_BINS / 2) as f64;
    let freqs: Vec<f64> = (0..N_BINS)
        .map(|i| start + i as f64 * BIN_WIDTH_MHZ)
        .collect();

    let mut text = String::new();
    let header: Vec<String> = freqs.iter().map(|f| format!("{f:.3}")).collect();
    text.push_str(&header.join(" "));
    text.push('\n');

    for row in 1..=rows {
        let values: Vec<String> = freqs
            .iter()
            .map(|&f| {
                let clean = if row % 2 == 1 { sky_dbm(f, row) } else { -60.0 };
                format!("{:.3}", clean + 0.3 * noise.normal())
            })
            .collect();
        text.push_str(&values.join(" "));
        text.push('\n');
    }
    text
}

fn main() -> std::io::Result<()> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_observation.txt".to_string());
    let mut noise = Noise(0x504F_414D);

    std::fs::write(&output, observation(N_ROWS, &mut noise))?;
    println!("Wrote {N_ROWS} rows × {N_BINS} bins to {output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_row_matches_the_header_width() {
        let text = observation(6, &mut Noise(1));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(text.ends_with('\n'));
        for line in &lines {
            let fields: Vec<f64> = line
                .split_whitespace()
                .map(|t| t.parse().unwrap())
                .collect();
            assert_eq!(fields.len(), N_BINS);
        }
    }

    #[test]
    fn calibration_rows_sit_near_the_load_level() {
        let text = observation(4, &mut Noise(7));
        let row2: Vec<f64> = text
            .lines()
            .nth(2)
            .unwrap()
            .split_whitespace()
            .map(|t| t.parse().unwrap())
            .collect();
        let mean = row2.iter().sum::<f64>() / row2.len() as f64;
        assert!((mean + 60.0).abs() < 0.2, "mean = {mean}");
    }
}
