//! English rendering of warnings.

use crate::convert::{SINGLE_BRAND_PATCH_NAME, SINGLE_BRAND_PATCH_SIZE};
use crate::dose::round2;
use crate::models::{Warning, WarningCode};

impl Warning {
    /// English message for this warning.
    pub fn message(&self) -> String {
        let drug = self.drug.as_deref().unwrap_or("this drug");
        let amount = self.amount.map(format_mg).unwrap_or_else(|| "?".into());
        let limit = self.limit.map(format_mg).unwrap_or_else(|| "?".into());

        match self.code {
            WarningCode::RenalBelow30 => "GFR < 30 ml/min: high risk of opioid overdose and \
                metabolite accumulation, which may lead to severe side effects! \
                25-50% dose reduction recommended during rotation!"
                .into(),
            WarningCode::RenalBelow10 => "GFR < 10 ml/min: high risk of opioid overdose and \
                metabolite accumulation, which may lead to severe side effects! \
                At least 50% dose reduction recommended during rotation!"
                .into(),
            WarningCode::RenalContraindicated => format!(
                "{drug} is CONTRAINDICATED at GFR < 30 ml/min! Active metabolites accumulate."
            ),
            WarningCode::RenalAvoid => format!(
                "AVOID {drug} at GFR < 30 ml/min! Active metabolites accumulate, \
                 causing neurotoxicity and sedation."
            ),
            WarningCode::RenalCaution => format!(
                "USE CAUTION with {drug} at GFR < 30 ml/min! Reduce dose and frequency. \
                 Monitor closely."
            ),
            WarningCode::RenalReductionFloor => format!(
                "Dose reduction raised to {amount}% because of renal impairment."
            ),
            WarningCode::Methadone => "Methadone has non-linear pharmacokinetics. The \
                calculated dose is for reference only; titration should be performed by a \
                specialist with ECG (QTc) monitoring, allowing 5-7 days for steady state."
                .into(),
            WarningCode::Nalbuphine => "Nalbuphine is a partial agonist/antagonist. \
                Switching to or from a pure mu-agonist may precipitate withdrawal symptoms."
                .into(),
            WarningCode::Pethidine => "Pethidine produces a neurotoxic metabolite \
                (norpethidine) that accumulates, especially in renal impairment. \
                Long-term use is not recommended."
                .into(),
            WarningCode::OxycodoneNaloxoneHepatic => "Oxycodone+naloxone is contraindicated \
                in moderate-to-severe hepatic impairment! Use pure oxycodone or another \
                opioid in such cases."
                .into(),
            WarningCode::FentanylMucosalTitration => "Transmucosal fentanyl requires \
                individual titration; it cannot be linearly converted from other opioids."
                .into(),
            WarningCode::FentanylPatchOnset => "Fentanyl patches take 12-24 hours to reach \
                therapeutic levels. The previous opioid should be continued for 12 hours \
                after application."
                .into(),
            WarningCode::TramadolCeiling => format!(
                "The maximum daily dose of tramadol is {limit} mg. The calculated dose \
                 ({amount} mg/day) exceeds this limit."
            ),
            WarningCode::BelowMinimumDose => format!(
                "The minimum available dose of {drug} is {limit} mg. The calculated dose \
                 ({amount} mg) is below this."
            ),
            WarningCode::BreakthroughEscalation => "If more than 3-4 breakthrough doses are \
                needed daily, re-evaluate and increase the scheduled dose."
                .into(),
            WarningCode::SingleBrandPatchStrength => format!(
                "The {} mcg/hr fentanyl patch is only available as {}.",
                SINGLE_BRAND_PATCH_SIZE, SINGLE_BRAND_PATCH_NAME
            ),
        }
    }
}

fn format_mg(value: f64) -> String {
    round2(value).to_string()
}
