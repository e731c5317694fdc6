//! Load policy groups from model-point tables
//!
//! Model points are column-oriented CSV with one row per policy group. The
//! same schema is written back out by [`write_model_points`], which is what
//! external modelling tools consume; a trailing initialization column some
//! of those tools carry is ignored on read.

use super::{Policy, PolicyGroup, PremiumMode, ProductDescriptor, Sex, WHOLE_LIFE_TERM};
use csv::Reader;
use std::error::Error;
use std::io::Write;
use std::path::Path;

/// Raw CSV row matching the model-point schema
#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct CsvRow {
    policy_id: u32,
    spec_id: String,
    age_at_entry: u32,
    sex: String,
    policy_term: u32,
    policy_count: f64,
    sum_assured: f64,
    duration_mth: i32,
    premium_pp: f64,
    av_pp_init: f64,
}

impl CsvRow {
    fn to_group(self) -> Result<PolicyGroup, Box<dyn Error>> {
        let sex = match self.sex.as_str() {
            "M" | "Male" => Sex::Male,
            "F" | "Female" => Sex::Female,
            other => return Err(format!("Unknown sex: {}", other).into()),
        };

        // Spec ids A/B are single-premium products, C/D level-premium
        let premium_mode = match self.spec_id.as_str() {
            "A" | "B" => PremiumMode::Single,
            "C" | "D" => PremiumMode::Level,
            other => return Err(format!("Unknown spec_id: {}", other).into()),
        };

        let term_years = if self.policy_term >= WHOLE_LIFE_TERM {
            None
        } else {
            Some(self.policy_term)
        };

        let policy = Policy {
            sex,
            issue_age: self.age_at_entry,
            // Elapsed duration converts to an issue month before the epoch
            issue_month: -self.duration_mth,
            term_years,
            assured: self.sum_assured,
            premium: self.premium_pp,
            account_value: self.av_pp_init,
            product: ProductDescriptor { premium_mode },
        };

        Ok(PolicyGroup::new(policy, self.policy_count))
    }
}

/// Load all policy groups from a CSV file
pub fn load_policy_groups<P: AsRef<Path>>(path: P) -> Result<Vec<PolicyGroup>, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut groups = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        groups.push(row.to_group()?);
    }

    Ok(groups)
}

/// Load policy groups from any reader (e.g., string buffer, network stream)
pub fn load_policy_groups_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<PolicyGroup>, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut groups = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        groups.push(row.to_group()?);
    }

    Ok(groups)
}

/// Write policy groups back out under the model-point schema.
///
/// Groups issued after the epoch carry a negative `duration_mth`; tools that
/// only understand in-force business should be fed month-0 state.
pub fn write_model_points<W: Write>(writer: W, groups: &[PolicyGroup]) -> Result<(), Box<dyn Error>> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for (i, group) in groups.iter().enumerate() {
        let policy = &group.policy;
        let row = CsvRow {
            policy_id: i as u32 + 1,
            spec_id: match policy.product.premium_mode {
                PremiumMode::Single => "A".to_string(),
                PremiumMode::Level => "C".to_string(),
            },
            age_at_entry: policy.issue_age,
            sex: match policy.sex {
                Sex::Male => "M".to_string(),
                Sex::Female => "F".to_string(),
            },
            policy_term: policy.term_years.unwrap_or(WHOLE_LIFE_TERM),
            policy_count: group.count,
            sum_assured: policy.assured,
            duration_mth: -policy.issue_month,
            premium_pp: policy.premium,
            av_pp_init: policy.account_value,
        };
        csv_writer.serialize(row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
policy_id,spec_id,age_at_entry,sex,policy_term,policy_count,sum_assured,duration_mth,premium_pp,av_pp_init
1,C,20,M,20,100,200000,0,0,0
2,C,45,F,20,80,600000,6,185.5,0
3,A,70,M,999,50,400000,0,400000,0
";

    #[test]
    fn test_load_policy_groups() {
        let groups = load_policy_groups_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(groups.len(), 3);

        let g1 = &groups[0];
        assert_eq!(g1.policy.issue_age, 20);
        assert_eq!(g1.policy.term_years, Some(20));
        assert_eq!(g1.policy.issue_month, 0);
        assert_eq!(g1.count, 100.0);

        // Seasoned business: 6 months elapsed becomes issue month -6
        let g2 = &groups[1];
        assert_eq!(g2.policy.sex, Sex::Female);
        assert_eq!(g2.policy.issue_month, -6);
        assert_eq!(g2.policy.premium, 185.5);

        // Term 999 is whole of life; spec A is single premium
        let g3 = &groups[2];
        assert_eq!(g3.policy.term_years, None);
        assert_eq!(g3.policy.product.premium_mode, PremiumMode::Single);
    }

    #[test]
    fn test_unknown_sex_rejected() {
        let bad = "\
policy_id,spec_id,age_at_entry,sex,policy_term,policy_count,sum_assured,duration_mth,premium_pp,av_pp_init
1,C,20,X,20,100,200000,0,0,0
";
        assert!(load_policy_groups_from_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_extra_trailing_column_ignored() {
        let with_extra = "\
policy_id,spec_id,age_at_entry,sex,policy_term,policy_count,sum_assured,duration_mth,premium_pp,av_pp_init,accum_prem_init_pp
1,C,20,M,20,100,200000,0,0,0,0
";
        let groups = load_policy_groups_from_reader(with_extra.as_bytes()).unwrap();
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_round_trip() {
        let groups = load_policy_groups_from_reader(SAMPLE.as_bytes()).unwrap();

        let mut buffer = Vec::new();
        write_model_points(&mut buffer, &groups).unwrap();

        let reloaded = load_policy_groups_from_reader(buffer.as_slice()).unwrap();
        assert_eq!(reloaded.len(), groups.len());
        assert_eq!(reloaded[1].policy, groups[1].policy);
        assert_eq!(reloaded[2].policy.term_years, None);
    }
}
