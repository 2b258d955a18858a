use std::time::Instant;

pub fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_elapsed_ms() {
        let start = Instant::now() - Duration::from_millis(25);
        assert!(elapsed_ms(start) >= 25);
    }
}
