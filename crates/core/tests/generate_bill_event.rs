//! End-to-end generation over a bill-event schema document.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use schemabind_core::{generate, SchemaDocument, SchemaError, Target};

const BILL_EVENT_SCHEMA: &str = r##"
components:
  schemas:
    EventMetadata:
      type: object
      description: Envelope metadata attached to every published event.
      required: [idempotencyKey, eventTimeStamp, schemaVersion]
      properties:
        idempotencyKey:
          type: string
          format: uuid
        correlationId:
          type: string
          format: uuid
        eventTimeStamp:
          type: string
          format: date-time
        schemaVersion:
          type: string
          pattern: "^\\d+\\.\\d+$"
    BillLineItem:
      type: object
      required: [lineId, amountInCents, costCodeId]
      properties:
        lineId:
          type: string
          format: uuid
        amountInCents:
          type: integer
          minimum: 0
        costCodeId:
          type: string
        costClassification:
          type: string
          enum: [labor, material, subcontract]
    Bill:
      type: object
      description: A bill issued against a project.
      required: [billId, billDate, billStatus, totalAmountInCents]
      properties:
        billId:
          type: string
          format: uuid
        billDate:
          type: string
          format: date
        dueDate:
          type: string
          format: date
        billStatus:
          type: string
          enum: [draft, posted, paid]
        totalAmountInCents:
          type: integer
          minimum: 0
        approval:
          type: object
          required: [approvalStatus]
          properties:
            approvalStatus:
              type: string
              enum: [pending, approved, rejected]
            approvedBy:
              type: string
              format: email
        lineItems:
          type: array
          items:
            $ref: "#/components/schemas/BillLineItem"
    BillEvent:
      type: object
      description: The envelope published for every bill change.
      required: [eventType, bill, eventMetadata]
      properties:
        eventType:
          type: string
          enum: [BillCreated, BillApproved, BillPaid]
        bill:
          $ref: "#/components/schemas/Bill"
        eventMetadata:
          $ref: "#/components/schemas/EventMetadata"
"##;

fn artifact(target: Target, name: &str) -> String {
    let doc = SchemaDocument::parse(BILL_EVENT_SCHEMA).unwrap();
    generate(&doc, target)
        .unwrap()
        .into_iter()
        .find(|a| a.filename == name)
        .unwrap()
        .contents
}

#[test]
fn python_models_follow_declaration_order_with_lifted_inline_objects() {
    let models = artifact(Target::Python, "models.py");
    let metadata = models.find("class EventMetadata(BaseModel):").unwrap();
    let approval = models.find("class BillApproval(BaseModel):").unwrap();
    let bill = models.find("class Bill(BaseModel):").unwrap();
    let event = models.find("class BillEvent(BaseModel):").unwrap();
    assert!(metadata < approval);
    assert!(approval < bill);
    assert!(bill < event);
    assert!(models.contains("    approval: Optional[BillApproval] = None"));
    assert!(models.contains("    bill: Bill"));
}

#[test]
fn python_validator_checks_nested_payloads_through_delegation() {
    let validator = artifact(Target::Python, "validator.py");
    assert!(validator.contains("def validate_bill_event(data: Dict[str, Any]) -> None:"));
    assert!(validator.contains("Validator.validate_bill(value)"));
    assert!(validator.contains("Validator.validate_bill_line_item(item)"));
    assert!(validator.contains("Validator.validate_bill_approval(value)"));
    assert!(
        validator.contains("raise ValidationError(\"totalAmountInCents must be >= 0\")"),
        "required-field and bound messages must cite the schema field name"
    );
    assert!(validator.contains("re.search(\"^\\\\d+\\\\.\\\\d+$\", value)"));
}

#[test]
fn python_unmarshaller_delegates_for_required_references() {
    let unmarshaller = artifact(Target::Python, "unmarshaller.py");
    assert!(unmarshaller.contains("bill=BillUnmarshaller.from_dict(data[\"bill\"])"));
    assert!(unmarshaller
        .contains("eventMetadata=EventMetadataUnmarshaller.from_dict(data[\"eventMetadata\"])"));
    let validate = unmarshaller.find("Validator.validate_bill_event(data)").unwrap();
    let construct = unmarshaller.find("return BillEvent(").unwrap();
    assert!(validate < construct);
}

#[test]
fn typescript_schemas_cover_nested_and_lifted_entities() {
    let validator = artifact(Target::TypeScript, "validator.ts");
    assert!(validator.contains("export const BillApprovalSchema: z.ZodTypeAny"));
    assert!(validator.contains("approval: BillApprovalSchema.nullish(),"));
    assert!(validator.contains("bill: BillSchema,"));
    assert!(validator.contains("eventType: z.enum([\"BillCreated\", \"BillApproved\", \"BillPaid\"]),"));
    assert!(validator.contains(".email(\"approvedBy must be a valid email address\")"));
}

#[test]
fn typescript_marshaller_emits_empty_arrays_explicitly() {
    let marshaller = artifact(Target::TypeScript, "marshaller.ts");
    assert!(marshaller
        .contains("lineItems: (data.lineItems ?? []).map((item) => billLineItemToWire(item)),"));
    assert!(marshaller.contains("bill: billToWire(data.bill),"));
    assert!(marshaller.contains("static marshalBillEvent(data: models.BillEvent): string {"));
}

#[test]
fn minimal_event_marshaller_delegates_and_validator_cites_missing_fields() {
    let schema = r##"
components:
  schemas:
    Bill:
      type: object
      required: [billId, amountInCents]
      properties:
        billId:
          type: string
        amountInCents:
          type: integer
    BillEvent:
      type: object
      required: [bill]
      properties:
        bill:
          $ref: "#/components/schemas/Bill"
"##;
    let doc = SchemaDocument::parse(schema).unwrap();

    let python: Vec<_> = generate(&doc, Target::Python).unwrap();
    let marshaller = &python
        .iter()
        .find(|a| a.filename == "marshaller.py")
        .unwrap()
        .contents;
    // Delegation by name only; Bill's fields are never inlined into BillEvent.
    assert!(marshaller.contains("\"bill\": BillMarshaller.to_dict(obj.bill)"));
    assert!(!marshaller.contains("\"bill\": {"));

    let validator = &python
        .iter()
        .find(|a| a.filename == "validator.py")
        .unwrap()
        .contents;
    assert!(validator.contains("for field in [\"billId\", \"amountInCents\"]:"));

    let ts = generate(&doc, Target::TypeScript).unwrap();
    let ts_marshaller = &ts
        .iter()
        .find(|a| a.filename == "marshaller.ts")
        .unwrap()
        .contents;
    assert!(ts_marshaller.contains("bill: billToWire(data.bill),"));
}

#[test]
fn integer_enum_constraints_match_across_targets() {
    let schema = r##"
components:
  schemas:
    BillRevision:
      type: object
      required: [revision]
      properties:
        revision:
          type: integer
          enum: [1, 2, 3]
"##;
    let doc = SchemaDocument::parse(schema).unwrap();

    let py_validator = generate(&doc, Target::Python)
        .unwrap()
        .into_iter()
        .find(|a| a.filename == "validator.py")
        .unwrap()
        .contents;
    assert!(py_validator.contains("if value not in [1, 2, 3]:"));

    let ts_validator = generate(&doc, Target::TypeScript)
        .unwrap()
        .into_iter()
        .find(|a| a.filename == "validator.ts")
        .unwrap()
        .contents;
    assert!(
        ts_validator.contains(".refine((value) => [1, 2, 3].includes(value)"),
        "non-string enums must be enforced in both validators"
    );
}

#[test]
fn dependency_order_override_reorders_declarations() {
    let reordered = format!("{BILL_EVENT_SCHEMA}\nx-dependency-order: [BillEvent, Bill]\n");
    let doc = SchemaDocument::parse(&reordered).unwrap();
    let models = generate(&doc, Target::Python)
        .unwrap()
        .into_iter()
        .find(|a| a.filename == "models.py")
        .unwrap()
        .contents;
    let event = models.find("class BillEvent(BaseModel):").unwrap();
    let bill = models.find("class Bill(BaseModel):").unwrap();
    let metadata = models.find("class EventMetadata(BaseModel):").unwrap();
    assert!(event < bill);
    assert!(bill < metadata);
}

#[test]
fn unknown_dependency_order_entry_fails_generation() {
    let reordered = format!("{BILL_EVENT_SCHEMA}\nx-dependency-order: [Vendor]\n");
    let err = SchemaDocument::parse(&reordered).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownOrderEntry(name) if name == "Vendor"));
}

#[test]
fn generation_is_byte_identical_across_runs() {
    for target in Target::all() {
        let doc = SchemaDocument::parse(BILL_EVENT_SCHEMA).unwrap();
        let first = generate(&doc, target).unwrap();
        let second = generate(&doc, target).unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.filename, b.filename);
            assert_eq!(a.contents, b.contents);
        }
    }
}

#[test]
fn dangling_reference_yields_no_artifacts_at_all() {
    let broken = BILL_EVENT_SCHEMA.replace(
        "\"#/components/schemas/BillLineItem\"",
        "\"#/components/schemas/LineItem\"",
    );
    let doc = SchemaDocument::parse(&broken).unwrap();
    for target in Target::all() {
        let err = generate(&doc, target).unwrap_err();
        match err {
            SchemaError::UnresolvedReference { entity, property, target } => {
                assert_eq!(entity, "Bill");
                assert_eq!(property, "lineItems");
                assert_eq!(target, "LineItem");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
