//! Clinical resources and their choice sets.

use rust_decimal::Decimal;

use super::datatypes::{
    Age, Annotation, Attachment, BooleanOrCodeableConcept, CodeableConcept, Dosage, Duration,
    Identifier, Period, Quantity, Range, Ratio, Reference, Timing,
};
use crate::primitives::{Canonical, Code, Date, DateTime, Instant, Time};
use crate::{fhir_choice, fhir_structure};

fhir_choice! {
    /// `dateTime | Age | Period | Range | string`: when a condition started or resolved.
    OnsetChoice {
        DateTime(DateTime) = "DateTime",
        Age(Age) = "Age",
        Period(Period) = "Period",
        Range(Range) = "Range",
        String(String) = "String",
    }
}

fhir_choice! {
    DateTimeOrPeriod {
        DateTime(DateTime) = "DateTime",
        Period(Period) = "Period",
    }
}

fhir_choice! {
    EffectiveChoice {
        DateTime(DateTime) = "DateTime",
        Period(Period) = "Period",
        Timing(Timing) = "Timing",
        Instant(Instant) = "Instant",
    }
}

fhir_choice! {
    ObservationValue {
        Quantity(Quantity) = "Quantity",
        CodeableConcept(CodeableConcept) = "CodeableConcept",
        String(String) = "String",
        Boolean(bool) = "Boolean",
        Integer(i32) = "Integer",
        Range(Range) = "Range",
        Ratio(Ratio) = "Ratio",
        Time(Time) = "Time",
        DateTime(DateTime) = "DateTime",
        Period(Period) = "Period",
    }
}

fhir_choice! {
    PerformedChoice {
        DateTime(DateTime) = "DateTime",
        Period(Period) = "Period",
        String(String) = "String",
        Age(Age) = "Age",
        Range(Range) = "Range",
    }
}

fhir_choice! {
    OccurrenceChoice {
        DateTime(DateTime) = "DateTime",
        String(String) = "String",
    }
}

fhir_choice! {
    BornChoice {
        Period(Period) = "Period",
        Date(Date) = "Date",
        String(String) = "String",
    }
}

fhir_choice! {
    AgeChoice {
        Age(Age) = "Age",
        Range(Range) = "Range",
        String(String) = "String",
    }
}

fhir_choice! {
    FamilyDeceasedChoice {
        Boolean(bool) = "Boolean",
        Age(Age) = "Age",
        Range(Range) = "Range",
        Date(Date) = "Date",
        String(String) = "String",
    }
}

fhir_choice! {
    DoseNumberChoice {
        PositiveInt(u32) = "PositiveInt",
        String(String) = "String",
    }
}

fhir_choice! {
    MedicationChoice {
        CodeableConcept(CodeableConcept) = "CodeableConcept",
        Reference(Reference) = "Reference",
    }
}

fhir_choice! {
    ReportedChoice {
        Boolean(bool) = "Boolean",
        Reference(Reference) = "Reference",
    }
}

fhir_structure! {
    domain_resource Condition {
        identifier: repeated Identifier = "identifier" [summary],
        clinical_status: optional CodeableConcept = "clinicalStatus" [summary],
        verification_status: optional CodeableConcept = "verificationStatus" [summary],
        category: repeated CodeableConcept = "category",
        severity: optional CodeableConcept = "severity",
        code: optional CodeableConcept = "code" [summary],
        body_site: repeated CodeableConcept = "bodySite" [summary],
        subject: required Reference = "subject" [summary],
        encounter: optional Reference = "encounter" [summary],
        onset: choice OnsetChoice = "onset" [summary],
        abatement: choice OnsetChoice = "abatement",
        recorded_date: optional DateTime = "recordedDate" [summary],
        recorder: optional Reference = "recorder" [summary],
        asserter: optional Reference = "asserter" [summary],
        stage: repeated ConditionStage = "stage",
        evidence: repeated ConditionEvidence = "evidence",
        note: repeated Annotation = "note",
    }
}

fhir_structure! {
    backbone ConditionStage {
        summary: optional CodeableConcept = "summary",
        assessment: repeated Reference = "assessment",
        type_: optional CodeableConcept = "type",
    }
}

fhir_structure! {
    backbone ConditionEvidence {
        code: repeated CodeableConcept = "code",
        detail: repeated Reference = "detail",
    }
}

fhir_structure! {
    /// Measurements and simple assertions about a subject.
    domain_resource Observation {
        identifier: repeated Identifier = "identifier" [summary],
        based_on: repeated Reference = "basedOn" [summary],
        part_of: repeated Reference = "partOf" [summary],
        status: required Code = "status" [summary],
        category: repeated CodeableConcept = "category",
        code: required CodeableConcept = "code" [summary],
        subject: optional Reference = "subject" [summary],
        focus: repeated Reference = "focus" [summary],
        encounter: optional Reference = "encounter" [summary],
        effective: choice EffectiveChoice = "effective" [summary],
        issued: optional Instant = "issued" [summary],
        performer: repeated Reference = "performer" [summary],
        value: choice ObservationValue = "value" [summary],
        data_absent_reason: optional CodeableConcept = "dataAbsentReason",
        interpretation: repeated CodeableConcept = "interpretation",
        note: repeated Annotation = "note",
        body_site: optional CodeableConcept = "bodySite",
        method: optional CodeableConcept = "method",
        specimen: optional Reference = "specimen",
        device: optional Reference = "device",
        reference_range: repeated ObservationReferenceRange = "referenceRange",
        has_member: repeated Reference = "hasMember" [summary],
        derived_from: repeated Reference = "derivedFrom" [summary],
        component: repeated ObservationComponent = "component" [summary],
    }
}

fhir_structure! {
    backbone ObservationReferenceRange {
        low: optional Quantity = "low",
        high: optional Quantity = "high",
        type_: optional CodeableConcept = "type",
        applies_to: repeated CodeableConcept = "appliesTo",
        age: optional Range = "age",
        text: optional String = "text",
    }
}

fhir_structure! {
    backbone ObservationComponent {
        code: required CodeableConcept = "code" [summary],
        value: choice ObservationValue = "value" [summary],
        data_absent_reason: optional CodeableConcept = "dataAbsentReason",
        interpretation: repeated CodeableConcept = "interpretation",
        reference_range: repeated ObservationReferenceRange = "referenceRange",
    }
}

impl Observation {
    pub fn value_quantity(&self) -> Option<&Quantity> {
        match &self.value {
            Some(ObservationValue::Quantity(quantity)) => Some(quantity),
            _ => None,
        }
    }

    /// Numeric value of the observation or of the component coded `system|code`.
    pub fn component_value(&self, system: &str, code: &str) -> Option<Decimal> {
        self.component
            .iter()
            .find(|component| component.code.has_coding(system, code))
            .and_then(|component| match &component.value {
                Some(ObservationValue::Quantity(quantity)) => quantity.value,
                _ => None,
            })
    }
}

fhir_structure! {
    domain_resource AllergyIntolerance {
        identifier: repeated Identifier = "identifier" [summary],
        clinical_status: optional CodeableConcept = "clinicalStatus" [summary],
        verification_status: optional CodeableConcept = "verificationStatus" [summary],
        type_: optional Code = "type" [summary],
        category: repeated Code = "category" [summary],
        criticality: optional Code = "criticality" [summary],
        code: optional CodeableConcept = "code" [summary],
        patient: required Reference = "patient" [summary],
        encounter: optional Reference = "encounter",
        onset: choice OnsetChoice = "onset",
        recorded_date: optional DateTime = "recordedDate",
        recorder: optional Reference = "recorder",
        asserter: optional Reference = "asserter" [summary],
        last_occurrence: optional DateTime = "lastOccurrence",
        note: repeated Annotation = "note",
        reaction: repeated AllergyIntoleranceReaction = "reaction",
    }
}

fhir_structure! {
    backbone AllergyIntoleranceReaction {
        substance: optional CodeableConcept = "substance",
        manifestation: repeated CodeableConcept = "manifestation",
        description: optional String = "description",
        onset: optional DateTime = "onset",
        severity: optional Code = "severity",
        exposure_route: optional CodeableConcept = "exposureRoute",
        note: repeated Annotation = "note",
    }
}

fhir_structure! {
    domain_resource Procedure {
        identifier: repeated Identifier = "identifier" [summary],
        based_on: repeated Reference = "basedOn" [summary],
        part_of: repeated Reference = "partOf" [summary],
        status: required Code = "status" [summary],
        status_reason: optional CodeableConcept = "statusReason" [summary],
        category: optional CodeableConcept = "category" [summary],
        code: optional CodeableConcept = "code" [summary],
        subject: required Reference = "subject" [summary],
        encounter: optional Reference = "encounter" [summary],
        performed: choice PerformedChoice = "performed" [summary],
        recorder: optional Reference = "recorder" [summary],
        asserter: optional Reference = "asserter" [summary],
        performer: repeated ProcedurePerformer = "performer" [summary],
        location: optional Reference = "location" [summary],
        reason_code: repeated CodeableConcept = "reasonCode" [summary],
        reason_reference: repeated Reference = "reasonReference" [summary],
        body_site: repeated CodeableConcept = "bodySite" [summary],
        outcome: optional CodeableConcept = "outcome" [summary],
        report: repeated Reference = "report",
        complication: repeated CodeableConcept = "complication",
        follow_up: repeated CodeableConcept = "followUp",
        note: repeated Annotation = "note",
    }
}

fhir_structure! {
    backbone ProcedurePerformer {
        function: optional CodeableConcept = "function" [summary],
        actor: required Reference = "actor" [summary],
        on_behalf_of: optional Reference = "onBehalfOf",
    }
}

fhir_structure! {
    domain_resource FamilyMemberHistory {
        identifier: repeated Identifier = "identifier" [summary],
        instantiates_canonical: repeated Canonical = "instantiatesCanonical" [summary],
        status: required Code = "status" [summary],
        data_absent_reason: optional CodeableConcept = "dataAbsentReason" [summary],
        patient: required Reference = "patient" [summary],
        date: optional DateTime = "date" [summary],
        name: optional String = "name" [summary],
        relationship: required CodeableConcept = "relationship" [summary],
        sex: optional CodeableConcept = "sex" [summary],
        born: choice BornChoice = "born",
        age: choice AgeChoice = "age",
        estimated_age: optional bool = "estimatedAge",
        deceased: choice FamilyDeceasedChoice = "deceased" [summary],
        reason_code: repeated CodeableConcept = "reasonCode" [summary],
        reason_reference: repeated Reference = "reasonReference" [summary],
        note: repeated Annotation = "note",
        condition: repeated FamilyMemberHistoryCondition = "condition",
    }
}

fhir_structure! {
    backbone FamilyMemberHistoryCondition {
        code: required CodeableConcept = "code",
        outcome: optional CodeableConcept = "outcome",
        contributed_to_death: optional bool = "contributedToDeath",
        onset: choice OnsetChoice = "onset",
        note: repeated Annotation = "note",
    }
}

fhir_structure! {
    domain_resource Immunization {
        identifier: repeated Identifier = "identifier" [summary],
        status: required Code = "status" [summary],
        status_reason: optional CodeableConcept = "statusReason",
        vaccine_code: required CodeableConcept = "vaccineCode" [summary],
        patient: required Reference = "patient" [summary],
        encounter: optional Reference = "encounter",
        occurrence: required_choice OccurrenceChoice = "occurrence" [summary],
        recorded: optional DateTime = "recorded",
        primary_source: optional bool = "primarySource" [summary],
        location: optional Reference = "location",
        manufacturer: optional Reference = "manufacturer",
        lot_number: optional String = "lotNumber",
        expiration_date: optional Date = "expirationDate",
        site: optional CodeableConcept = "site",
        route: optional CodeableConcept = "route",
        dose_quantity: optional Quantity = "doseQuantity",
        performer: repeated ImmunizationPerformer = "performer" [summary],
        note: repeated Annotation = "note" [summary],
        reason_code: repeated CodeableConcept = "reasonCode",
        reason_reference: repeated Reference = "reasonReference",
        is_subpotent: optional bool = "isSubpotent" [summary],
        protocol_applied: repeated ImmunizationProtocolApplied = "protocolApplied",
    }
}

fhir_structure! {
    backbone ImmunizationPerformer {
        function: optional CodeableConcept = "function" [summary],
        actor: required Reference = "actor" [summary],
    }
}

fhir_structure! {
    backbone ImmunizationProtocolApplied {
        series: optional String = "series",
        authority: optional Reference = "authority",
        target_disease: repeated CodeableConcept = "targetDisease",
        dose_number: required_choice DoseNumberChoice = "doseNumber",
        series_doses: choice DoseNumberChoice = "seriesDoses",
    }
}

fhir_structure! {
    domain_resource MedicationRequest {
        identifier: repeated Identifier = "identifier",
        status: required Code = "status" [summary],
        status_reason: optional CodeableConcept = "statusReason",
        intent: required Code = "intent" [summary],
        category: repeated CodeableConcept = "category",
        priority: optional Code = "priority" [summary],
        do_not_perform: optional bool = "doNotPerform" [summary],
        reported: choice ReportedChoice = "reported" [summary],
        medication: required_choice MedicationChoice = "medication" [summary],
        subject: required Reference = "subject" [summary],
        encounter: optional Reference = "encounter",
        authored_on: optional DateTime = "authoredOn" [summary],
        requester: optional Reference = "requester" [summary],
        reason_code: repeated CodeableConcept = "reasonCode",
        reason_reference: repeated Reference = "reasonReference",
        note: repeated Annotation = "note",
        dosage_instruction: repeated Dosage = "dosageInstruction",
        dispense_request: optional MedicationRequestDispenseRequest = "dispenseRequest",
        substitution: optional MedicationRequestSubstitution = "substitution",
    }
}

fhir_structure! {
    backbone MedicationRequestDispenseRequest {
        validity_period: optional Period = "validityPeriod",
        number_of_repeats_allowed: optional u32 = "numberOfRepeatsAllowed",
        quantity: optional Quantity = "quantity",
        expected_supply_duration: optional Duration = "expectedSupplyDuration",
        performer: optional Reference = "performer",
    }
}

fhir_structure! {
    backbone MedicationRequestSubstitution {
        allowed: required_choice BooleanOrCodeableConcept = "allowed",
        reason: optional CodeableConcept = "reason",
    }
}

fhir_structure! {
    domain_resource DiagnosticReport {
        identifier: repeated Identifier = "identifier" [summary],
        based_on: repeated Reference = "basedOn",
        status: required Code = "status" [summary],
        category: repeated CodeableConcept = "category" [summary],
        code: required CodeableConcept = "code" [summary],
        subject: optional Reference = "subject" [summary],
        encounter: optional Reference = "encounter" [summary],
        effective: choice DateTimeOrPeriod = "effective" [summary],
        issued: optional Instant = "issued" [summary],
        performer: repeated Reference = "performer" [summary],
        results_interpreter: repeated Reference = "resultsInterpreter" [summary],
        specimen: repeated Reference = "specimen",
        result: repeated Reference = "result",
        conclusion: optional String = "conclusion",
        conclusion_code: repeated CodeableConcept = "conclusionCode",
        presented_form: repeated Attachment = "presentedForm",
    }
}
