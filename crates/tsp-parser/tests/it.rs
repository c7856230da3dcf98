mod parse_euc_2d;
mod parse_explicit;
mod random_instance;
mod tour_roundtrip;
