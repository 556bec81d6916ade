/// Number of distinct bases; rows of every emission matrix have this
/// many columns
pub const NUM_BASES: usize = 4;

/// DNA bases in their integer coding order `A=0, C=1, G=2, T=3`
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Dna {
    A,
    C,
    G,
    T,
}

impl Dna {
    pub fn from_byte(b: u8) -> Option<Dna> {
        match b {
            b'A' | b'a' => Some(Dna::A),
            b'C' | b'c' => Some(Dna::C),
            b'G' | b'g' => Some(Dna::G),
            b'T' | b't' => Some(Dna::T),
            _ => None,
        }
    }

    pub fn from_code(code: u8) -> Option<Dna> {
        match code {
            0 => Some(Dna::A),
            1 => Some(Dna::C),
            2 => Some(Dna::G),
            3 => Some(Dna::T),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Dna::A => 0,
            Dna::C => 1,
            Dna::G => 2,
            Dna::T => 3,
        }
    }

    pub fn to_byte(&self) -> u8 {
        match self {
            Dna::A => b'A',
            Dna::C => b'C',
            Dna::G => b'G',
            Dna::T => b'T',
        }
    }

    pub fn complement(&self) -> Dna {
        match self {
            Dna::A => Dna::T,
            Dna::C => Dna::G,
            Dna::G => Dna::C,
            Dna::T => Dna::A,
        }
    }
}

impl std::fmt::Display for Dna {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_byte() as char)
    }
}
